//! Storage provider configuration.

use std::path::PathBuf;

/// Which storage backend holds attachment files.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible object storage.
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem (development).
    LocalFs {
        /// Root directory for stored files.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Local filesystem provider rooted at the given path.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Provider name for record keeping.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "fs",
        }
    }
}

/// Storage configuration with upload constraints.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// The backing provider.
    pub provider: StorageProvider,
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,
    /// Accepted MIME types; empty means accept anything.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Creates a configuration with default constraints (25 MiB, documents
    /// and images).
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: 25 * 1024 * 1024,
            allowed_mime_types: vec![
                "application/pdf".to_string(),
                "image/png".to_string(),
                "image/jpeg".to_string(),
            ],
        }
    }

    /// Returns true if the MIME type is acceptable.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.is_empty()
            || self
                .allowed_mime_types
                .iter()
                .any(|allowed| allowed == mime_type)
    }
}
