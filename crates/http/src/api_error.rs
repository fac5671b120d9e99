//! Typed API error for HTTP handlers.
//!
//! Converts domain errors into proper HTTP responses with JSON body and status codes.
//! Handlers return `Result<Json<T>, ApiError>`; the body is always
//! `{"error": "message"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pmos_llm::LlmError;
use pmos_service::ServiceError;
use pmos_storage::StorageError;

/// API error with HTTP status code and human-readable message.
///
/// `Internal` logs the real error server-side and returns a static message to
/// the client.
#[derive(Debug)]
pub enum ApiError {
    /// 400: malformed body, query or path, or a rejected value.
    BadRequest(String),
    /// 401: missing or unknown bearer token.
    Unauthorized,
    /// 402: the LLM gateway wants payment. Upstream body passed through.
    PaymentRequired(String),
    /// 403: someone else's resource, or a locked agent.
    Forbidden(String),
    NotFound(String),
    /// 422: valid syntax but semantic rejection (duplicate, full squad).
    UnprocessableEntity(String),
    /// 429: the LLM gateway is rate limiting. Upstream body passed through.
    RateLimited(String),
    /// 502: the LLM gateway failed or returned unusable output.
    BadGateway(String),
    /// 503: required backend not configured.
    ServiceUnavailable(String),
    /// 500: unexpected failure. Details logged, not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "missing or invalid bearer token".to_owned())
            },
            Self::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            Self::BadGateway(msg) => {
                tracing::warn!(error = %msg, "upstream failure");
                (StatusCode::BAD_GATEWAY, msg)
            },
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err.root() {
            LlmError::RateLimited(body) => return Self::RateLimited(body.clone()),
            LlmError::PaymentRequired(body) => return Self::PaymentRequired(body.clone()),
            _ => {},
        }
        if matches!(err, LlmError::ClientInit(_)) {
            return Self::Internal(err.into());
        }
        Self::BadGateway(err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(StorageError::Duplicate(msg) | StorageError::Conflict(msg)) => {
                Self::UnprocessableEntity(msg)
            },
            ServiceError::Storage(StorageError::NotFound { entity, id }) => {
                Self::NotFound(format!("{entity} '{id}' not found"))
            },
            ServiceError::Llm(e) => e.into(),
            ServiceError::InvalidInput(msg) => Self::BadRequest(msg),
            ServiceError::Forbidden(msg) => Self::Forbidden(msg),
            ServiceError::NotFound(_) => Self::NotFound(err.to_string()),
            ServiceError::Unprocessable(msg) => Self::UnprocessableEntity(msg),
            ServiceError::NotConfigured(msg) => Self::ServiceUnavailable(msg),
            ServiceError::Storage(_) | ServiceError::Serialization(_) => Self::Internal(err.into()),
        }
    }
}
