//! Firebase Authentication for the Swirl data layer.
//!
//! This crate provides:
//! - A REST client for the Identity Toolkit and Secure Token APIs
//! - The signed-in session (`FirebaseAuth`) with ID-token refresh
//! - The identity-provider seam for permission-scoped social login
//! - Token sources used to authorize database requests

pub mod authenticator;
pub mod client;
pub mod credential;
pub mod error;
pub mod identity;
pub mod service_account;
pub mod session;
pub mod token;
pub mod types;
pub mod user;

pub use authenticator::Authenticator;
pub use client::{AuthConfig, FirebaseAuthClient};
pub use credential::{AuthCredential, ProviderToken, ReadPermission, READ_PERMISSIONS};
pub use error::{AuthError, AuthResult};
pub use identity::{IdentityProvider, LoginOutcome, UiContext};
pub use service_account::ServiceAccountTokenSource;
pub use session::FirebaseAuth;
pub use token::{AccessToken, StaticTokenSource, TokenKind, TokenSource};
pub use user::AuthUser;
