//! User profile model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{PostId, UserId};
use crate::record::Record;

/// A user profile stored at `users/{uid}`.
///
/// Equality is structural: the UID lists are compared element by element,
/// in order. Use [`SwirlUser::same_shape`] for the cheaper count-based
/// comparison list diffing needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SwirlUser {
    /// Auth uid
    pub uid: UserId,

    /// Public handle
    pub username: String,

    /// Free-form profile text
    #[serde(default)]
    pub biography: String,

    /// Posts owned by this user, oldest first
    #[serde(rename = "postUIDs", default)]
    pub post_uids: Vec<PostId>,

    #[serde(rename = "followerUIDs", default)]
    pub follower_uids: Vec<UserId>,

    #[serde(rename = "followingUIDs", default)]
    pub following_uids: Vec<UserId>,

    /// Profile photo URL
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl SwirlUser {
    /// Create a new user with an empty biography and no posts or follows.
    pub fn new(uid: UserId, username: impl Into<String>) -> Self {
        Self {
            uid,
            username: username.into(),
            biography: String::new(),
            post_uids: Vec::new(),
            follower_uids: Vec::new(),
            following_uids: Vec::new(),
            photo_url: None,
        }
    }

    /// Scalar fields equal and UID lists of equal length.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.username == other.username
            && self.biography == other.biography
            && self.post_uids.len() == other.post_uids.len()
            && self.follower_uids.len() == other.follower_uids.len()
            && self.following_uids.len() == other.following_uids.len()
            && self.photo_url == other.photo_url
    }
}

impl Record for SwirlUser {}
