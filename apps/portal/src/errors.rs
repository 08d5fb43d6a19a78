use thiserror::Error;

/// Library-level error type.
/// Validation failures are raised before any network attempt; `Exhausted`
/// aggregates a full candidate walk that never succeeded.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("All {attempts} endpoint candidates failed for {operation}; last: {last}")]
    Exhausted {
        operation: &'static str,
        attempts: usize,
        last: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}
