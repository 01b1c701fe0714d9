//! Blob storage for the Swirl data layer.
//!
//! This crate provides:
//! - The `BlobStore` trait the data service uploads through
//! - An S3-compatible client (path-style, custom endpoint)
//! - Download URL resolution (public base URL or presigned GET)

pub mod client;
pub mod error;
pub mod store;

pub use client::{BlobStorageClient, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use store::{BlobStore, ContentType, UploadedBlob};
