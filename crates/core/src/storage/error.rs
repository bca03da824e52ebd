//! Storage error types.

use thiserror::Error;

/// Errors from the attachment store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Provider configuration is invalid.
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    /// File exceeds the configured size limit.
    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Actual size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// MIME type is not on the allowlist.
    #[error("MIME type {0} is not allowed")]
    InvalidMimeType(String),

    /// Object not found in storage.
    #[error("Stored object not found: {0}")]
    NotFound(String),

    /// Backend I/O failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(e: opendal::Error) -> Self {
        if e.kind() == opendal::ErrorKind::NotFound {
            Self::NotFound(e.to_string())
        } else {
            Self::Backend(e.to_string())
        }
    }
}
