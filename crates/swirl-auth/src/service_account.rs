//! Service-account tokens for server-side database access.
//!
//! Provides a thread-safe, async-aware token cache with:
//! - Refresh margin to avoid token expiry during requests
//! - Single-flight pattern to prevent thundering herd on refresh
//! - Graceful fallback to existing valid token on refresh failure

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};
use crate::token::{AccessToken, TokenSource};

/// Refresh margin: refresh token 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Conservative token TTL when expiry is unknown (50 minutes).
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scopes accepted by the Realtime Database REST API.
pub const DATABASE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/userinfo.email",
];

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// OAuth token source backed by a Google service account.
pub struct ServiceAccountTokenSource {
    provider: Arc<dyn TokenProvider>,
    cache: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    /// Load the service account named by `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_env() -> AuthResult<Self> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            AuthError::config_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Self::new(Arc::new(sa))),
            None => Err(AuthError::config_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    async fn refresh(&self, cache: &mut Option<CachedToken>) -> AuthResult<String> {
        match self.provider.token(&DATABASE_SCOPES).await {
            Ok(token) => {
                let access_token = token.as_str().to_string();

                let expires_at = {
                    let now = Utc::now();
                    let exp = token.expires_at();
                    if exp > now {
                        match (exp - now).to_std() {
                            Ok(ttl) => Instant::now() + ttl,
                            Err(_) => Instant::now() + TOKEN_DEFAULT_TTL,
                        }
                    } else {
                        Instant::now()
                    }
                };

                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at,
                });

                debug!("Refreshed service account token");
                Ok(access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref() {
                    if cached.is_usable() {
                        warn!("Service account token refresh failed, using existing token: {}", e);
                        return Ok(cached.access_token.clone());
                    }
                }

                Err(AuthError::RefreshFailed(format!(
                    "Failed to obtain service account token: {}",
                    e
                )))
            }
        }
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> AuthResult<AccessToken> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(AccessToken::oauth(cached.access_token.clone()));
                }
            }
        }

        let mut cache = self.cache.write().await;

        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(AccessToken::oauth(cached.access_token.clone()));
            }
        }

        self.refresh(&mut cache).await.map(AccessToken::oauth)
    }

    async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_database_scopes() {
        assert!(DATABASE_SCOPES.iter().any(|s| s.ends_with("firebase.database")));
        assert!(DATABASE_SCOPES.iter().any(|s| s.ends_with("userinfo.email")));
    }

    #[test]
    fn test_cached_token_margin() {
        let fresh = CachedToken {
            access_token: "t".into(),
            expires_at: Instant::now() + Duration::from_secs(600),
        };
        assert!(fresh.is_valid());

        let closing = CachedToken {
            access_token: "t".into(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };
        assert!(!closing.is_valid());
        assert!(closing.is_usable());
    }

    #[test]
    #[serial]
    fn test_from_env_without_credentials() {
        std::env::remove_var("GOOGLE_APPLICATION_CREDENTIALS");
        assert!(matches!(
            ServiceAccountTokenSource::from_env(),
            Err(AuthError::ConfigError(_))
        ));
    }
}
