//! Credit-note-specific error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while preparing a credit note.
#[derive(Debug, Error)]
pub enum CreditNoteError {
    /// Amount is zero or negative.
    #[error("Credit note amount must be positive")]
    NonPositiveAmount,

    /// Reason is missing or blank.
    #[error("Credit note reason is required")]
    ReasonRequired,

    /// Credit note date lies in the future.
    #[error("Credit note date {0} is in the future")]
    DateInFuture(NaiveDate),
}

impl CreditNoteError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        400
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::ReasonRequired => "CREDIT_REASON_REQUIRED",
            Self::DateInFuture(_) => "CREDIT_DATE_IN_FUTURE",
        }
    }
}
