//! Identity Toolkit and Secure Token REST types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Token lifetime assumed when the backend omits or garbles `expiresIn`.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Request body for `accounts:signInWithIdp`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest {
    pub post_body: String,
    pub request_uri: String,
    pub return_idp_credential: bool,
    pub return_secure_token: bool,
}

/// Response of `accounts:signInWithIdp`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpResponse {
    pub local_id: String,
    pub id_token: String,
    pub refresh_token: String,
    /// Lifetime of the ID token in seconds, sent as a string
    pub expires_in: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Response of the Secure Token `token` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub user_id: String,
}

/// Error envelope returned by Google REST APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Parse an `expiresIn` value into a duration.
pub fn parse_expires_in(value: &str) -> Duration {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL)
}
