//! The blob storage seam.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// MIME type attached to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "video/mp4")]
    Video,
    #[serde(rename = "application/octet-stream")]
    OctetStream,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video/mp4",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    pub key: String,
    pub size: u64,
    pub content_type: ContentType,
    /// Retrievable URL, when the store can produce one.
    pub download_url: Option<String>,
}

/// Write-only object store keyed by slash-separated names.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: ContentType,
    ) -> StorageResult<UploadedBlob>;
}
