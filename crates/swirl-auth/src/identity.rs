//! Identity-provider seam.
//!
//! The interactive, permission-scoped login (the social SDK's own UI) lives
//! in the host application. It is injected through [`IdentityProvider`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::credential::{ProviderToken, ReadPermission};
use crate::error::AuthResult;

/// Opaque UI handle forwarded from the caller to the identity provider.
#[derive(Clone)]
pub struct UiContext(Arc<dyn Any + Send + Sync>);

impl UiContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Context carrying nothing, for headless providers.
    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for UiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UiContext")
    }
}

/// Result of an interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user dismissed the login.
    Cancelled,
    /// The user granted the requested permissions.
    Granted(ProviderToken),
}

/// Third-party identity provider performing permission-scoped logins.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn log_in(
        &self,
        ui: &UiContext,
        permissions: &[ReadPermission],
    ) -> AuthResult<LoginOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Presenter(&'static str);

    #[test]
    fn test_ui_context_downcast() {
        let ui = UiContext::new(Presenter("profile"));
        assert_eq!(ui.downcast_ref::<Presenter>(), Some(&Presenter("profile")));
        assert!(ui.downcast_ref::<String>().is_none());
    }
}
