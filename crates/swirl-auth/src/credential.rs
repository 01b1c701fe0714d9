//! Provider tokens, read permissions and backend credentials.

use std::fmt;

/// Read permissions requested from the identity provider at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadPermission {
    PublicProfile,
    Email,
    UserFriends,
}

impl ReadPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadPermission::PublicProfile => "public_profile",
            ReadPermission::Email => "email",
            ReadPermission::UserFriends => "user_friends",
        }
    }
}

impl fmt::Display for ReadPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Permissions requested by every login.
pub const READ_PERMISSIONS: [ReadPermission; 3] = [
    ReadPermission::PublicProfile,
    ReadPermission::Email,
    ReadPermission::UserFriends,
];

/// Access token issued by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderToken(String);

impl ProviderToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderToken(<redacted>)")
    }
}

/// Credential exchanged with the auth backend for a session.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCredential {
    Facebook { access_token: String },
}

impl AuthCredential {
    /// Build a Facebook credential from a provider token.
    pub fn facebook(token: &ProviderToken) -> Self {
        Self::Facebook {
            access_token: token.as_str().to_string(),
        }
    }

    /// Provider id understood by the auth backend.
    pub fn provider_id(&self) -> &'static str {
        match self {
            AuthCredential::Facebook { .. } => "facebook.com",
        }
    }

    /// Form-encoded `postBody` for `accounts:signInWithIdp`.
    pub(crate) fn post_body(&self) -> String {
        match self {
            AuthCredential::Facebook { access_token } => format!(
                "access_token={}&providerId={}",
                urlencoding::encode(access_token),
                self.provider_id()
            ),
        }
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredential")
            .field("provider_id", &self.provider_id())
            .finish_non_exhaustive()
    }
}
