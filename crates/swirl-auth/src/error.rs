//! Authentication error types.

use thiserror::Error;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur during sign-in and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to configure auth client: {0}")]
    ConfigError(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Request rejected ({code}): {message}")]
    Rejected { code: u16, message: String },

    #[error("No signed-in user")]
    NotSignedIn,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { code, .. } => Some(*code),
            AuthError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
