//! Data service error types.

use swirl_auth::AuthError;
use swirl_database::DatabaseError;
use swirl_models::ModelError;
use swirl_storage::StorageError;
use thiserror::Error;

/// Result type for data service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to the app's screens.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No authenticated user")]
    NoUser,

    #[error("Upload did not produce a download URL")]
    NoDownloadUrl,

    #[error("No data at {0}")]
    NoData(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn no_data(path: impl ToString) -> Self {
        Self::NoData(path.to_string())
    }
}
