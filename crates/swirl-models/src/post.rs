//! Post model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{PostId, UserId};
use crate::record::Record;

/// A published short video.
///
/// `loops` and `likes` are maintained server-side; this crate only ever
/// creates posts with zeroed counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Post {
    /// Unique post ID
    pub uid: PostId,

    /// Public download URL of the uploaded video
    pub url: String,

    /// Owner (user ID)
    #[serde(rename = "ownerUID")]
    pub owner_uid: UserId,

    /// Title entered by the owner
    pub title: String,

    /// Play count
    #[serde(default)]
    pub loops: u64,

    /// Like count
    #[serde(default)]
    pub likes: u64,
}

impl Post {
    /// Create a new post with zeroed counters.
    pub fn new(
        uid: PostId,
        url: impl Into<String>,
        owner_uid: UserId,
        title: impl Into<String>,
    ) -> Self {
        Self {
            uid,
            url: url.into(),
            owner_uid,
            title: title.into(),
            loops: 0,
            likes: 0,
        }
    }
}

impl Record for Post {}
