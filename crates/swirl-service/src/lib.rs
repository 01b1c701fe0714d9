//! Swirl data service.
//!
//! The single entry point the app's screens talk to. It composes the
//! database, blob storage, authentication session, and identity provider
//! behind three narrow capability traits:
//! - [`ProfileDataServiceable`]: current user and their posts
//! - [`AuthDataServiceable`]: session state and social login
//! - [`SubmitPostDataServiceable`]: video upload and post publication

pub mod config;
pub mod contracts;
pub mod error;
pub mod nodes;
pub mod service;
pub mod telemetry;

pub use config::ServiceConfig;
pub use contracts::{AuthDataServiceable, ProfileDataServiceable, SubmitPostDataServiceable};
pub use error::{ServiceError, ServiceResult};
pub use nodes::{DatabaseNodes, StorageNodes};
pub use service::DataService;
