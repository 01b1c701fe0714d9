//! Firebase Authentication REST client.

use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use tracing::{debug, info_span, Instrument};

use crate::credential::AuthCredential;
use crate::error::{AuthError, AuthResult};
use crate::types::{
    ErrorResponse, RefreshTokenResponse, SignInWithIdpRequest, SignInWithIdpResponse,
};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Redirect URI sent with IdP sign-ins; native clients have none.
const REQUEST_URI: &str = "http://localhost";

// =============================================================================
// Configuration
// =============================================================================

/// Auth client configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Web API key of the Firebase project
    pub api_key: String,
    /// Identity Toolkit base URL
    pub identity_toolkit_url: String,
    /// Secure Token base URL
    pub secure_token_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl AuthConfig {
    /// Config against the production endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            identity_toolkit_url: IDENTITY_TOOLKIT_URL.to_string(),
            secure_token_url: SECURE_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    ///
    /// `FIREBASE_AUTH_EMULATOR_HOST` (e.g. `127.0.0.1:9099`) routes both
    /// endpoints to the local emulator.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var("FIREBASE_API_KEY")
            .map_err(|_| AuthError::config_error("FIREBASE_API_KEY not set"))?;

        if api_key.is_empty() {
            return Err(AuthError::config_error("FIREBASE_API_KEY cannot be empty"));
        }

        let mut config = Self::new(api_key);

        if let Ok(host) = std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            if !host.is_empty() {
                config.identity_toolkit_url =
                    format!("http://{}/identitytoolkit.googleapis.com/v1", host);
                config.secure_token_url = format!("http://{}/securetoken.googleapis.com/v1", host);
            }
        }

        Ok(config)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Firebase Authentication REST client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    http: Client,
    config: AuthConfig,
}

impl FirebaseAuthClient {
    /// Create a new auth client.
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("swirl-auth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AuthError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AuthResult<Self> {
        Self::new(AuthConfig::from_env()?)
    }

    /// Exchange an identity-provider credential for a Firebase session.
    pub async fn sign_in_with_idp(
        &self,
        credential: &AuthCredential,
    ) -> AuthResult<SignInWithIdpResponse> {
        let url = format!(
            "{}/accounts:signInWithIdp?key={}",
            self.config.identity_toolkit_url, self.config.api_key
        );
        let body = SignInWithIdpRequest {
            post_body: credential.post_body(),
            request_uri: REQUEST_URI.to_string(),
            return_idp_credential: true,
            return_secure_token: true,
        };

        let span = info_span!(
            "auth_request",
            operation = "sign_in_with_idp",
            provider = credential.provider_id()
        );
        async {
            let start = Instant::now();
            let response = self.http.post(&url).json(&body).send().await?;
            let parsed: SignInWithIdpResponse = Self::parse_response(response).await?;
            debug!(
                uid = %parsed.local_id,
                new_user = parsed.is_new_user,
                latency_ms = start.elapsed().as_millis() as u64,
                "Signed in with identity provider"
            );
            Ok::<_, AuthError>(parsed)
        }
        .instrument(span)
        .await
    }

    /// Trade a refresh token for a fresh ID token.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshTokenResponse> {
        let url = format!("{}/token?key={}", self.config.secure_token_url, self.config.api_key);
        let form = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];

        async {
            let response = self.http.post(&url).form(&form).send().await?;
            let parsed: RefreshTokenResponse = Self::parse_response(response).await?;
            debug!(uid = %parsed.user_id, "Refreshed ID token");
            Ok::<_, AuthError>(parsed)
        }
        .instrument(info_span!("auth_request", operation = "refresh_token"))
        .await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(response: Response) -> AuthResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                AuthError::invalid_response(format!(
                    "{} (body prefix: {})",
                    e,
                    body.chars().take(200).collect::<String>()
                ))
            });
        }

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => Err(AuthError::Rejected {
                code: err.error.code,
                message: err.error.message,
            }),
            Err(_) => Err(AuthError::Rejected {
                code: status.as_u16(),
                message: body,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
