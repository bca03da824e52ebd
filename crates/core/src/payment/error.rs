//! Payment-specific error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use remit_shared::types::PaymentTypeId;

/// Errors that can occur while validating or recording a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment date lies in the future.
    #[error("Payment date {0} is in the future")]
    DateInFuture(NaiveDate),

    /// Amount is zero or negative.
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    /// Amount carries more than two decimal places.
    #[error("Payment amount must have at most two decimal places")]
    TooManyDecimalPlaces,

    /// Amount exceeds the remaining balance at the instant of recording.
    #[error("Payment amount exceeds the remaining balance of {remaining}")]
    AmountExceedsBalance {
        /// The actual remaining balance.
        remaining: Decimal,
    },

    /// The referenced payment type is inactive.
    #[error("Payment type {0} is inactive")]
    PaymentTypeInactive(PaymentTypeId),

    /// The payment type requires a reference string and none was given.
    #[error("Payment reference is required for this payment type")]
    ReferenceRequired,
}

impl PaymentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::DateInFuture(_)
            | Self::NonPositiveAmount
            | Self::TooManyDecimalPlaces
            | Self::ReferenceRequired => 400,
            Self::AmountExceedsBalance { .. } => 422,
            Self::PaymentTypeInactive(_) => 404,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DateInFuture(_) => "PAYMENT_DATE_IN_FUTURE",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::TooManyDecimalPlaces => "TOO_MANY_DECIMAL_PLACES",
            Self::AmountExceedsBalance { .. } => "AMOUNT_EXCEEDS_BALANCE",
            Self::PaymentTypeInactive(_) => "PAYMENT_TYPE_INACTIVE",
            Self::ReferenceRequired => "PAYMENT_REFERENCE_REQUIRED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exceeds_balance_names_the_remaining_amount() {
        let err = PaymentError::AmountExceedsBalance {
            remaining: dec!(123.45),
        };
        assert!(err.to_string().contains("123.45"));
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "AMOUNT_EXCEEDS_BALANCE");
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        assert_eq!(PaymentError::NonPositiveAmount.status_code(), 400);
        assert_eq!(PaymentError::TooManyDecimalPlaces.status_code(), 400);
        assert_eq!(PaymentError::ReferenceRequired.status_code(), 400);
    }
}
