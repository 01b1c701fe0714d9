//! Signed-in session with ID-token refresh.
//!
//! The session snapshot is read synchronously (`is_authenticated` must not
//! await). Refreshes are single-flight: concurrent callers wait on one
//! refresh instead of each hitting the token endpoint.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::authenticator::Authenticator;
use crate::client::FirebaseAuthClient;
use crate::credential::AuthCredential;
use crate::error::{AuthError, AuthResult};
use crate::token::{AccessToken, TokenSource};
use crate::types::parse_expires_in;
use crate::user::AuthUser;

/// Refresh the ID token this long before it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct Session {
    user: AuthUser,
    id_token: String,
    refresh_token: String,
    expires_at: Instant,
}

impl Session {
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Firebase Authentication session.
pub struct FirebaseAuth {
    client: FirebaseAuthClient,
    session: RwLock<Option<Session>>,
    refresh_guard: Mutex<()>,
}

impl FirebaseAuth {
    pub fn new(client: FirebaseAuthClient) -> Self {
        Self {
            client,
            session: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> AuthResult<Self> {
        Ok(Self::new(FirebaseAuthClient::from_env()?))
    }

    fn snapshot(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Apply refreshed tokens unless the user signed out or switched meanwhile.
    fn apply_refresh(
        &self,
        uid: &str,
        id_token: String,
        refresh_token: String,
        expires_at: Instant,
    ) {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_mut() {
            if session.user.uid.as_str() == uid {
                session.id_token = id_token;
                session.refresh_token = refresh_token;
                session.expires_at = expires_at;
            }
        }
    }

    async fn refresh_id_token(&self) -> AuthResult<AccessToken> {
        let _guard = self.refresh_guard.lock().await;

        // Another task may have refreshed while we waited
        let session = self.snapshot().ok_or(AuthError::NotSignedIn)?;
        if session.is_valid() {
            return Ok(AccessToken::id_token(session.id_token));
        }

        match self.client.refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                let expires_at = Instant::now() + parse_expires_in(&refreshed.expires_in);
                self.apply_refresh(
                    session.user.uid.as_str(),
                    refreshed.id_token.clone(),
                    refreshed.refresh_token,
                    expires_at,
                );
                debug!(uid = %session.user.uid, "Refreshed session ID token");
                Ok(AccessToken::id_token(refreshed.id_token))
            }
            Err(e) if session.is_usable() => {
                warn!("ID token refresh failed, using existing token: {}", e);
                Ok(AccessToken::id_token(session.id_token))
            }
            Err(e) => Err(AuthError::RefreshFailed(e.to_string())),
        }
    }
}

#[async_trait]
impl Authenticator for FirebaseAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    async fn sign_in(&self, credential: &AuthCredential) -> AuthResult<AuthUser> {
        let response = self.client.sign_in_with_idp(credential).await?;

        let user = AuthUser {
            uid: response.local_id.into(),
            display_name: response.display_name,
            email: response.email,
            photo_url: response.photo_url,
        };

        self.replace(Some(Session {
            user: user.clone(),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: Instant::now() + parse_expires_in(&response.expires_in),
        }));

        info!(uid = %user.uid, provider = credential.provider_id(), "Signed in");
        Ok(user)
    }

    async fn sign_out(&self) {
        if let Some(session) = self.snapshot() {
            info!(uid = %session.user.uid, "Signed out");
        }
        self.replace(None);
    }
}

#[async_trait]
impl TokenSource for FirebaseAuth {
    async fn access_token(&self) -> AuthResult<AccessToken> {
        match self.snapshot() {
            Some(session) if session.is_valid() => Ok(AccessToken::id_token(session.id_token)),
            Some(_) => self.refresh_id_token().await,
            None => Err(AuthError::NotSignedIn),
        }
    }

    async fn invalidate(&self) {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_mut() {
            // Keep the token usable as a fallback but force the next refresh
            session.expires_at = session.expires_at.min(Instant::now() + TOKEN_REFRESH_MARGIN);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
