use thiserror::Error;

/// Validation failures raised by domain types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl CoreError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), reason: reason.into() }
    }
}

/// Rejects blank strings and strings longer than `max_chars`.
pub(crate) fn require_text(field: &str, value: &str, max_chars: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid(field, "must not be empty"));
    }
    if value.chars().count() > max_chars {
        return Err(CoreError::invalid(field, format!("must be at most {max_chars} characters")));
    }
    Ok(())
}

/// Rejects lists with blank entries or more than `max_items` entries.
pub(crate) fn require_items(
    field: &str,
    items: &[String],
    min_items: usize,
    max_items: usize,
) -> Result<(), CoreError> {
    if items.len() < min_items {
        return Err(CoreError::invalid(field, format!("needs at least {min_items} entries")));
    }
    if items.len() > max_items {
        return Err(CoreError::invalid(field, format!("has more than {max_items} entries")));
    }
    if let Some(pos) = items.iter().position(|s| s.trim().is_empty()) {
        return Err(CoreError::invalid(format!("{field}[{pos}]"), "must not be empty"));
    }
    Ok(())
}
