//! Workflow error types for the invoice lifecycle.

use thiserror::Error;

use crate::invoice::InvoiceStatus;
use crate::workflow::types::ActorRole;

/// Errors that can occur during lifecycle transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The actor's role does not permit this action.
    #[error("Role {role} is not permitted to {action} invoices")]
    Forbidden {
        /// The attempted action.
        action: &'static str,
        /// The actor's role.
        role: ActorRole,
    },

    /// The action is not valid for the invoice's current status.
    #[error("Cannot {action} an invoice in status {current}")]
    InvalidState {
        /// The attempted action.
        action: &'static str,
        /// The invoice's current status.
        current: InvoiceStatus,
    },

    /// The invoice is already on hold.
    #[error("Invoice is already on hold")]
    AlreadyOnHold,

    /// The invoice is already soft-deleted.
    #[error("Invoice is already hidden")]
    AlreadyHidden,

    /// Restore was attempted on an invoice that is not hidden.
    #[error("Invoice is not hidden")]
    NotHidden,

    /// A hidden invoice rejects every mutating action.
    #[error("Invoice is hidden; restore it before making changes")]
    Hidden,

    /// The rejection reason is shorter than the required minimum.
    #[error("Rejection reason must be at least {minimum} characters")]
    ReasonTooShort {
        /// The minimum trimmed length.
        minimum: usize,
    },

    /// The hold reason is missing or blank.
    #[error("Hold reason is required")]
    HoldReasonRequired,
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden { .. } => 403,
            Self::InvalidState { .. }
            | Self::AlreadyOnHold
            | Self::AlreadyHidden
            | Self::NotHidden
            | Self::Hidden
            | Self::ReasonTooShort { .. }
            | Self::HoldReasonRequired => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::AlreadyOnHold => "ALREADY_ON_HOLD",
            Self::AlreadyHidden => "ALREADY_HIDDEN",
            Self::NotHidden => "NOT_HIDDEN",
            Self::Hidden => "HIDDEN",
            Self::ReasonTooShort { .. } => "VALIDATION_ERROR",
            Self::HoldReasonRequired => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_names_the_current_status() {
        let err = WorkflowError::InvalidState {
            action: "approve",
            current: InvoiceStatus::Unpaid,
        };
        assert!(err.to_string().contains("unpaid"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_STATE");
    }

    #[test]
    fn test_forbidden_names_the_role() {
        let err = WorkflowError::Forbidden {
            action: "approve",
            role: ActorRole::StandardUser,
        };
        assert!(err.to_string().contains("standard_user"));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_reason_too_short_is_a_validation_error() {
        let err = WorkflowError::ReasonTooShort { minimum: 10 };
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("10"));
    }
}
