//! The database seam.

use async_trait::async_trait;
use serde_json::Value;
use swirl_models::JsonMap;

use crate::error::DatabaseResult;
use crate::path::DatabasePath;

/// A node value together with the ETag it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    /// `None` when the node does not exist.
    pub value: Option<Value>,
    pub etag: String,
}

/// Hierarchical JSON key-value store.
#[async_trait]
pub trait Database: Send + Sync {
    /// Read the subtree at `path`. A missing node reads as `None`.
    async fn get(&self, path: &DatabasePath) -> DatabaseResult<Option<Value>>;

    /// Check whether a node exists without downloading its subtree.
    async fn exists(&self, path: &DatabasePath) -> DatabaseResult<bool>;

    /// Replace the subtree at `path`.
    async fn set(&self, path: &DatabasePath, value: &Value) -> DatabaseResult<()>;

    /// Merge `children` into the node at `path`.
    ///
    /// Keys may be slash-separated relative paths, so a single call can
    /// write several locations atomically.
    async fn update(&self, path: &DatabasePath, children: &JsonMap) -> DatabaseResult<()>;

    /// Read the subtree at `path` together with its ETag.
    async fn get_versioned(&self, path: &DatabasePath) -> DatabaseResult<Versioned>;

    /// Replace the subtree at `path` only if it is still at `etag`.
    ///
    /// Fails with `DatabaseError::PreconditionFailed` when another writer got there first.
    async fn set_if_match(
        &self,
        path: &DatabasePath,
        value: &Value,
        etag: &str,
    ) -> DatabaseResult<()>;
}
