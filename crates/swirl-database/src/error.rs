//! Realtime Database error types.

use swirl_auth::AuthError;
use thiserror::Error;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential error: {0}")]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatabaseError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP status code to an error.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 => Self::Unauthorized(msg),
            403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            412 => Self::PreconditionFailed(msg),
            429 => Self::RateLimited(msg),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(msg),
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            DatabaseError::Unauthorized(_) => Some(401),
            DatabaseError::PermissionDenied(_) => Some(403),
            DatabaseError::NotFound(_) => Some(404),
            DatabaseError::PreconditionFailed(_) => Some(412),
            DatabaseError::RateLimited(_) => Some(429),
            DatabaseError::ServerError(status, _) => Some(*status),
            DatabaseError::Network(e) => e.status().map(|s| s.as_u16()),
            DatabaseError::Auth(e) => e.http_status(),
            _ => None,
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DatabaseError::Network(_)
                | DatabaseError::RateLimited(_)
                | DatabaseError::ServerError(_, _)
        )
    }

    /// True if a conditional write lost against a concurrent writer.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, DatabaseError::PreconditionFailed(_))
    }
}
