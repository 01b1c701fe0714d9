//! Backend session seam.

use async_trait::async_trait;

use crate::credential::AuthCredential;
use crate::error::AuthResult;
use crate::user::AuthUser;

/// Backend authentication session.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Currently signed-in user, from cached session state.
    fn current_user(&self) -> Option<AuthUser>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Exchange a provider credential for a backend session.
    async fn sign_in(&self, credential: &AuthCredential) -> AuthResult<AuthUser>;

    async fn sign_out(&self);
}
