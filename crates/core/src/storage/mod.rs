//! File attachment storage.
//!
//! # Modules
//!
//! - `config` - Provider selection and upload constraints
//! - `error` - Storage error types
//! - `service` - OpenDAL-backed store/delete operations

pub mod config;
pub mod error;
pub mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, StoredAttachment, UploadInput};
