//! Storage service implementation using Apache OpenDAL.

use opendal::{Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Input for storing one attachment.
#[derive(Debug, Clone)]
pub struct UploadInput {
    /// Invoice the file backs.
    pub invoice_id: Uuid,
    /// Attachment ID the key is derived from.
    pub attachment_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Content type (MIME type).
    pub content_type: String,
    /// File bytes.
    pub bytes: Vec<u8>,
    /// Who uploaded the file.
    pub uploaded_by: Uuid,
}

/// Reference to a stored attachment file.
#[derive(Debug, Clone)]
pub struct StoredAttachment {
    /// Key the object was written under.
    pub storage_key: String,
    /// Provider that holds it.
    pub storage_provider: String,
    /// Stored size in bytes.
    pub file_size: u64,
}

/// Storage service for attachment files.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an upload against the configured constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::FileTooLarge {
                size,
                limit: self.config.max_file_size,
            });
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::InvalidMimeType(content_type.to_string()));
        }

        Ok(())
    }

    /// Generate the storage key for an attachment.
    ///
    /// Format: `{invoice_id}/{attachment_id}/{sanitized_filename}`
    #[must_use]
    pub fn generate_storage_key(invoice_id: Uuid, attachment_id: Uuid, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            invoice_id,
            attachment_id,
            sanitize_filename(filename)
        )
    }

    /// Store an attachment's bytes.
    ///
    /// Called inside the invoice create/update transaction; a failure here
    /// must abort the caller's transaction, so the error is returned
    /// rather than logged away.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload violates constraints or the backend
    /// write fails.
    pub async fn store(&self, input: UploadInput) -> Result<StoredAttachment, StorageError> {
        let size = input.bytes.len() as u64;
        self.validate_upload(&input.content_type, size)?;

        let key = Self::generate_storage_key(input.invoice_id, input.attachment_id, &input.filename);
        self.operator.write(&key, input.bytes).await?;

        Ok(StoredAttachment {
            storage_key: key,
            storage_provider: self.config.provider.name().to_string(),
            file_size: size,
        })
    }

    /// Delete a stored object; a missing object is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for backend failures other than not-found.
    pub async fn delete(&self, storage_key: &str) -> Result<(), StorageError> {
        match self.operator.delete(storage_key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Strip path separators and control characters from a filename.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
