//! Data service configuration.

use swirl_auth::AuthConfig;
use swirl_database::DatabaseConfig;
use swirl_storage::StorageConfig;

use crate::error::ServiceResult;

/// Attempts for the optimistic append to a user's post index.
pub const DEFAULT_INDEX_APPEND_ATTEMPTS: u32 = 5;

/// Everything [`crate::DataService::connect`] needs to reach the backends.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    /// Bound on conditional-write retries when appending to `postUIDs`
    pub index_append_attempts: u32,
}

impl ServiceConfig {
    /// Create config from environment variables, loading `.env` first if present.
    pub fn from_env() -> ServiceResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            index_append_attempts: index_append_attempts_from_env(),
        })
    }
}

fn index_append_attempts_from_env() -> u32 {
    std::env::var("SWIRL_INDEX_APPEND_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_INDEX_APPEND_ATTEMPTS)
}
