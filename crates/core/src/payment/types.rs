//! Payment domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use remit_shared::types::{InvoiceId, PaymentId, PaymentTypeId, UserId};

/// A recorded payment against an invoice.
///
/// Payments are created once and never mutated or deleted; the only path
/// that removes them is the purge cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// Invoice this payment settles (part of).
    pub invoice_id: InvoiceId,
    /// Amount paid (> 0, at most two decimal places).
    pub amount_paid: Decimal,
    /// Date the payment was made (not in the future).
    pub payment_date: NaiveDate,
    /// Payment type reference.
    pub payment_type_id: PaymentTypeId,
    /// Reference string; required when the payment type demands one.
    pub payment_reference: Option<String>,
    /// Withheld tax in effect when this payment was recorded.
    pub tds_amount_applied: Decimal,
    /// Snapshot of the rounding mode used for this payment.
    pub tds_rounded: bool,
    /// Who recorded the payment.
    pub created_by: UserId,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

/// A payment awaiting validation and recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCandidate {
    /// Amount to pay.
    pub amount_paid: Decimal,
    /// Date of the payment.
    pub payment_date: NaiveDate,
    /// Payment type reference.
    pub payment_type_id: PaymentTypeId,
    /// Reference string, if the type requires one.
    pub payment_reference: Option<String>,
    /// Per-payment override of the invoice's rounding preference.
    pub tds_rounded: Option<bool>,
}

/// The slice of a payment type the ledger needs for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTypeInfo {
    /// The payment type's ID.
    pub id: PaymentTypeId,
    /// Whether the type is active.
    pub is_active: bool,
    /// Whether payments of this type must carry a reference string.
    pub requires_reference: bool,
}
