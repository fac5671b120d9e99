//! Typed error enum for the service layer.
//!
//! Unifies storage and LLM failures with the caller-facing outcomes
//! (forbidden, not found, unprocessable) so handlers can map each to a status
//! without downcasting.

use pmos_core::CoreError;
use pmos_llm::LlmError;
use pmos_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// LLM gateway call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Caller provided invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The resource exists but belongs to someone else, or is locked.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Well-formed request that cannot be applied in the current state.
    #[error("{0}")]
    Unprocessable(String),

    /// Required backend (LLM gateway) is not configured.
    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Llm(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Storage(StorageError::NotFound { .. }))
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Owner check shared by every per-user resource.
pub(crate) fn ensure_owner(
    owner: uuid::Uuid,
    caller: uuid::Uuid,
    what: &str,
) -> Result<(), ServiceError> {
    if owner == caller {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("{what} belongs to another user")))
    }
}
