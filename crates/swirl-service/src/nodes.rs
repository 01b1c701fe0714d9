//! Database and storage locations.

use swirl_database::{DatabasePath, DatabaseResult};
use swirl_models::{PostId, UserId};

/// Database tree layout.
///
/// ```text
/// users/{uid}                  SwirlUser
/// users/{uid}/postUIDs         ordered post index
/// posts/{ownerUID}/{postUID}   Post
/// ```
pub struct DatabaseNodes;

impl DatabaseNodes {
    pub const USERS: &'static str = "users";
    pub const POSTS: &'static str = "posts";
    pub const POST_UIDS: &'static str = "postUIDs";

    pub fn user(uid: &UserId) -> DatabaseResult<DatabasePath> {
        DatabasePath::root().child(Self::USERS)?.child(uid.as_str())
    }

    pub fn user_post_uids(uid: &UserId) -> DatabaseResult<DatabasePath> {
        Self::user(uid)?.child(Self::POST_UIDS)
    }

    /// An owner's post collection.
    pub fn posts(owner: &UserId) -> DatabaseResult<DatabasePath> {
        DatabasePath::root().child(Self::POSTS)?.child(owner.as_str())
    }

    pub fn post(post: &PostId) -> DatabaseResult<DatabasePath> {
        DatabasePath::root().child(Self::POSTS)?.child(post.as_str())
    }

    pub fn owned_post(owner: &UserId, post: &PostId) -> DatabaseResult<DatabasePath> {
        Self::posts(owner)?.child(post.as_str())
    }
}

/// Blob storage layout.
pub struct StorageNodes;

impl StorageNodes {
    pub const ALL_POSTS: &'static str = "allPosts";

    /// Object key of a post's video.
    pub fn post_video(post: &PostId) -> String {
        format!("{}/{}", Self::ALL_POSTS, post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_layout() {
        let uid = UserId::from("u1".to_string());
        let post = PostId::from_string("P1");
        assert_eq!(DatabaseNodes::user(&uid).unwrap().to_string(), "users/u1");
        assert_eq!(
            DatabaseNodes::user_post_uids(&uid).unwrap().to_string(),
            "users/u1/postUIDs"
        );
        assert_eq!(DatabaseNodes::posts(&uid).unwrap().to_string(), "posts/u1");
        assert_eq!(DatabaseNodes::post(&post).unwrap().to_string(), "posts/P1");
        assert_eq!(
            DatabaseNodes::owned_post(&uid, &post).unwrap().to_string(),
            "posts/u1/P1"
        );
    }

    #[test]
    fn test_rejects_unsafe_uid() {
        let uid = UserId::from("a.b".to_string());
        assert!(DatabaseNodes::user(&uid).is_err());
    }

    #[test]
    fn test_storage_layout() {
        let post = PostId::from_string("P1");
        assert_eq!(StorageNodes::post_video(&post), "allPosts/P1");
    }
}
