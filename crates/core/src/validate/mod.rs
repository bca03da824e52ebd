//! Composable field validators.
//!
//! Each business rule is one named function returning a `FieldError`; the
//! create/update paths compose them through a [`Validation`] accumulator
//! in a fixed order, so callers get every field failure in one response
//! and the pipeline order itself stays testable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use remit_shared::types::amount::{has_at_most_two_decimals, is_valid_percentage};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// The offending field.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Aggregated validation failure, surfaced per field.
#[derive(Debug, Error)]
#[error("Validation failed: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join("; "))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        400
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }
}

/// Accumulator running rules in the order they are chained.
#[derive(Debug, Default)]
pub struct Validation {
    errors: Vec<FieldError>,
}

impl Validation {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one rule and continues.
    #[must_use]
    pub fn check(mut self, outcome: Result<(), FieldError>) -> Self {
        if let Err(e) = outcome {
            self.errors.push(e);
        }
        self
    }

    /// Finishes the pipeline.
    ///
    /// # Errors
    ///
    /// Returns every collected `FieldError`, in pipeline order.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self.errors))
        }
    }
}

/// The amount must be strictly positive.
pub fn amount_positive(field: &'static str, amount: Decimal) -> Result<(), FieldError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(FieldError::new(field, "must be greater than zero"))
    }
}

/// The amount must carry at most two decimal places.
pub fn max_two_decimals(field: &'static str, amount: Decimal) -> Result<(), FieldError> {
    if has_at_most_two_decimals(amount) {
        Ok(())
    } else {
        Err(FieldError::new(field, "must have at most two decimal places"))
    }
}

/// The withholding percentage must be present iff withholding applies,
/// and inside the 0-100 range.
pub fn withholding_percentage(
    applicable: bool,
    percentage: Option<Decimal>,
) -> Result<(), FieldError> {
    match (applicable, percentage) {
        (true, None) => Err(FieldError::new(
            "tds_percentage",
            "required when withholding is applicable",
        )),
        (true, Some(p)) if !is_valid_percentage(p) => Err(FieldError::new(
            "tds_percentage",
            "must be between 0 and 100",
        )),
        (false, Some(_)) => Err(FieldError::new(
            "tds_percentage",
            "must be absent when withholding is not applicable",
        )),
        _ => Ok(()),
    }
}

/// The date must not lie in the future.
pub fn date_not_future(
    field: &'static str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), FieldError> {
    if date <= today {
        Ok(())
    } else {
        Err(FieldError::new(field, "must not be in the future"))
    }
}

/// The due date must not precede the invoice date.
pub fn due_on_or_after_invoice_date(
    invoice_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<(), FieldError> {
    if due_date >= invoice_date {
        Ok(())
    } else {
        Err(FieldError::new(
            "due_date",
            "must be on or after the invoice date",
        ))
    }
}

/// A recurring billing period must end on or after it starts.
pub fn period_ordered(start: NaiveDate, end: NaiveDate) -> Result<(), FieldError> {
    if end >= start {
        Ok(())
    } else {
        Err(FieldError::new(
            "period_end",
            "must be on or after the period start",
        ))
    }
}

/// A text field must be non-blank after trimming.
pub fn non_blank(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::new(field, "must not be blank"))
    } else {
        Ok(())
    }
}

/// A text field must reach a minimum trimmed length.
pub fn min_trimmed_len(field: &'static str, value: &str, minimum: usize) -> Result<(), FieldError> {
    if value.trim().chars().count() >= minimum {
        Ok(())
    } else {
        Err(FieldError::new(
            field,
            format!("must be at least {minimum} characters"),
        ))
    }
}
