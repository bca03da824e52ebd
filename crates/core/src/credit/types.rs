//! Credit note domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use remit_shared::types::{AttachmentId, CreditNoteId, InvoiceId, UserId};

/// A recorded credit note against an invoice.
///
/// Credit notes are append-only: once created they permanently reduce the
/// invoice's effective net payable and are reflected in every subsequent
/// payment's maximum allowed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditNote {
    /// Unique identifier.
    pub id: CreditNoteId,
    /// Invoice being reduced.
    pub invoice_id: InvoiceId,
    /// Reduction amount (> 0; may exceed the remaining balance).
    pub amount: Decimal,
    /// Reason for the adjustment (required).
    pub reason: String,
    /// Whether withheld tax was reversed alongside the reduction.
    pub tds_applicable: bool,
    /// Proportionally reversed withheld tax (computed, capped).
    pub tds_amount: Decimal,
    /// Date on the credit note document (not in the future).
    pub credit_note_date: NaiveDate,
    /// Optional supporting document.
    pub attachment_id: Option<AttachmentId>,
    /// Who recorded the credit note.
    pub created_by: UserId,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

/// A credit note awaiting validation and recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditNoteCandidate {
    /// Reduction amount.
    pub amount: Decimal,
    /// Reason for the adjustment.
    pub reason: String,
    /// Whether the caller opts into proportional tax reversal.
    pub reverse_tds: bool,
    /// Date on the credit note document.
    pub credit_note_date: NaiveDate,
    /// Optional supporting document.
    pub attachment_id: Option<AttachmentId>,
}

/// A validated credit note ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCreditNote {
    /// Reduction amount.
    pub amount: Decimal,
    /// Trimmed reason.
    pub reason: String,
    /// Whether tax reversal was applied.
    pub tds_applicable: bool,
    /// Proportionally reversed withheld tax.
    pub tds_amount: Decimal,
    /// Date on the credit note document.
    pub credit_note_date: NaiveDate,
    /// Optional supporting document.
    pub attachment_id: Option<AttachmentId>,
    /// Set when the amount exceeds the remaining balance at recording
    /// time. Surfaced to the caller as a warning, never a rejection:
    /// refund and adjustment flows legitimately produce credit balances.
    pub exceeds_balance: bool,
}
