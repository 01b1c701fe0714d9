//! Model error types.

use thiserror::Error;

/// Result type for model encoding and decoding.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while encoding or decoding records.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
