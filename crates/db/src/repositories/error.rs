//! Repository error rollup.
//!
//! One error enum serves every repository: the source rules live in
//! `remit-core` and already carry their own typed errors, so the
//! persistence layer only adds the storage-shaped failure modes.

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use remit_core::credit::CreditNoteError;
use remit_core::payment::PaymentError;
use remit_core::storage::StorageError;
use remit_core::validate::ValidationError;
use remit_core::workflow::WorkflowError;

/// Errors surfaced by the repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Lifecycle rule violation.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Field-level validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Payment ledger rule violation.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Credit note rule violation.
    #[error(transparent)]
    CreditNote(#[from] CreditNoteError),

    /// Invoice number already used within its uniqueness scope.
    #[error("Invoice number already exists within scope {scope}")]
    DuplicateInvoiceNumber {
        /// The scope the number collided in.
        scope: String,
    },

    /// A referenced master-data record does not exist.
    #[error("{kind} {id} not found")]
    MasterDataMissing {
        /// Master-data kind (vendor, category, ...).
        kind: &'static str,
        /// The missing ID.
        id: Uuid,
    },

    /// A referenced master-data record is inactive.
    #[error("{kind} {id} is inactive")]
    MasterDataInactive {
        /// Master-data kind.
        kind: &'static str,
        /// The inactive ID.
        id: Uuid,
    },

    /// Attachment storage failure; aborts the enclosing transaction.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored row violates a shape the schema should guarantee.
    #[error("Inconsistent stored data: {0}")]
    Inconsistent(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::MasterDataMissing { .. } => 404,
            Self::Workflow(e) => e.status_code(),
            Self::Validation(e) => e.status_code(),
            Self::Payment(e) => e.status_code(),
            Self::CreditNote(e) => e.status_code(),
            Self::DuplicateInvoiceNumber { .. } => 409,
            Self::MasterDataInactive { .. } => 400,
            Self::Storage(_) | Self::Inconsistent(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Workflow(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::CreditNote(e) => e.error_code(),
            Self::DuplicateInvoiceNumber { .. } => "DUPLICATE_INVOICE_NUMBER",
            Self::MasterDataMissing { .. } => "MASTER_DATA_NOT_FOUND",
            Self::MasterDataInactive { .. } => "MASTER_DATA_INACTIVE",
            Self::Storage(_) => "STORAGE_FAILURE",
            Self::Inconsistent(_) | Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_scope() {
        let err = RepositoryError::DuplicateInvoiceNumber {
            scope: "(invoice_number, vendor, profile)".to_string(),
        };
        assert!(err.to_string().contains("vendor"));
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_INVOICE_NUMBER");
    }

    #[test]
    fn test_storage_failures_are_internal() {
        let err = RepositoryError::Storage(StorageError::Backend("disk full".to_string()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_FAILURE");
    }

    #[test]
    fn test_workflow_errors_pass_through() {
        let err = RepositoryError::Workflow(WorkflowError::AlreadyOnHold);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "ALREADY_ON_HOLD");
    }
}
