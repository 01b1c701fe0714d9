//! Capability traits handed to the app's screens.
//!
//! Each screen depends on the narrowest trait it needs; [`crate::DataService`]
//! implements all of them.

use std::path::Path;

use async_trait::async_trait;
use swirl_auth::UiContext;
use swirl_models::{Post, PostId, SwirlUser};

use crate::error::ServiceResult;

/// Profile screen: the signed-in user and their posts.
#[async_trait]
pub trait ProfileDataServiceable: Send + Sync {
    async fn get_current_user(&self) -> ServiceResult<SwirlUser>;

    async fn get_posts(&self, user: &SwirlUser) -> ServiceResult<Vec<Post>>;
}

/// Login screen.
#[async_trait]
pub trait AuthDataServiceable: Send + Sync {
    /// Whether a backend session exists. No I/O.
    fn is_authenticated(&self) -> bool;

    /// Run the social login. `Ok(false)` when the user cancels.
    async fn request_login(&self, ui: &UiContext) -> ServiceResult<bool>;
}

/// Post composer.
#[async_trait]
pub trait SubmitPostDataServiceable: Send + Sync {
    /// Upload the video at `video` and publish it under `title`.
    async fn submit_post(&self, video: &Path, title: &str) -> ServiceResult<PostId>;
}
