//! Typed error enum for the LLM crate.

use thiserror::Error;

/// Errors from LLM API operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("LLM gateway rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("LLM gateway requires payment: {0}")]
    PaymentRequired(String),
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty response: no choices returned")]
    EmptyResponse,
    #[error("model did not call tool `{0}`")]
    MissingToolCall(String),
    #[error("model returned invalid output: {0}")]
    InvalidOutput(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("all retries exhausted, last error: {0}")]
    RetriesExhausted(Box<LlmError>),
}

impl LlmError {
    /// Whether this error is transient and should be retried.
    ///
    /// Rate limits and payment errors are surfaced to the caller unchanged.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 500 | 502 | 503 | 529),
            _ => false,
        }
    }

    /// The underlying error once retry wrapping is removed.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::RetriesExhausted(inner) => inner.root(),
            other => other,
        }
    }
}
