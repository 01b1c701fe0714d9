//! Realtime Database access for the Swirl data layer.
//!
//! This crate provides:
//! - Validated database paths
//! - The `Database` trait the data service is written against
//! - A REST client with token refresh, ETag conditional writes, and metrics
//! - Optimistic read-modify-write transactions

pub mod client;
pub mod database;
pub mod error;
pub mod metrics;
pub mod path;
pub mod transaction;

pub use client::{DatabaseConfig, RealtimeDatabaseClient};
pub use database::{Database, Versioned};
pub use error::{DatabaseError, DatabaseResult};
pub use path::DatabasePath;
pub use transaction::run_transaction;
