//! Access tokens used to authorize backend requests.

use std::fmt;

use async_trait::async_trait;

use crate::error::AuthResult;

/// Kind of bearer credential, which decides how it is attached to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Firebase ID token of a signed-in user.
    IdToken,
    /// Google OAuth2 access token of a service account.
    OAuth,
}

impl TokenKind {
    /// Query parameter carrying the token on Realtime Database REST calls.
    pub fn query_param(&self) -> &'static str {
        match self {
            TokenKind::IdToken => "auth",
            TokenKind::OAuth => "access_token",
        }
    }
}

/// A bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub kind: TokenKind,
}

impl AccessToken {
    pub fn id_token(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: TokenKind::IdToken,
        }
    }

    pub fn oauth(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: TokenKind::OAuth,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Source of valid access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Get a token valid for at least the next request.
    async fn access_token(&self) -> AuthResult<AccessToken>;

    /// Drop any cached token so the next call fetches a fresh one.
    async fn invalidate(&self) {}
}

/// Token source returning a fixed token (emulators, tests, pre-minted tokens).
#[derive(Debug, Clone)]
pub struct StaticTokenSource(AccessToken);

impl StaticTokenSource {
    pub fn new(token: AccessToken) -> Self {
        Self(token)
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> AuthResult<AccessToken> {
        Ok(self.0.clone())
    }
}
