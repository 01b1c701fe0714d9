//! Shared data models for the Swirl data layer.
//!
//! This crate provides Serde-serializable types for:
//! - Posts (uploaded short videos)
//! - User profiles
//! - The key-value record codec used for database reads and writes
//! - Username derivation for first-time sign-ins

pub mod error;
pub mod ids;
pub mod post;
pub mod record;
pub mod user;
pub mod username;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use ids::{PostId, UserId};
pub use post::Post;
pub use record::{JsonMap, Record};
pub use user::SwirlUser;
pub use username::{derive_username, placeholder_username};
