//! Audit event types and sink trait.
//!
//! The sink is fire-and-forget from the caller's point of view: repository
//! code wraps `record` so a failing sink is logged and swallowed, never
//! allowed to fail the primary operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use remit_shared::types::{InvoiceId, UserId};

/// Lifecycle actions recorded against an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Invoice created.
    Created,
    /// Invoice fields edited.
    Updated,
    /// Approval granted.
    Approved,
    /// Approval refused.
    Rejected,
    /// Payments suspended.
    Held,
    /// Hold lifted.
    Released,
    /// Payment recorded.
    PaymentRecorded,
    /// Credit note recorded.
    CreditNoteRecorded,
    /// Soft-deleted.
    SoftDeleted,
    /// Restored from soft delete.
    Restored,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Held => "held",
            Self::Released => "released",
            Self::PaymentRecorded => "payment_recorded",
            Self::CreditNoteRecorded => "credit_note_recorded",
            Self::SoftDeleted => "soft_deleted",
            Self::Restored => "restored",
        }
    }
}

/// One audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The invoice acted on.
    pub invoice_id: InvoiceId,
    /// Who acted.
    pub actor_id: UserId,
    /// What happened.
    pub action: AuditAction,
    /// Snapshot before the change, when one exists.
    pub before: Option<serde_json::Value>,
    /// Snapshot after the change, when one exists.
    pub after: Option<serde_json::Value>,
}

/// Error from an audit sink.
#[derive(Debug, Error)]
#[error("Audit sink error: {0}")]
pub struct AuditError(pub String);

/// Destination for audit events.
///
/// Implemented by the persistence layer; callers must treat failures as
/// non-fatal.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    fn record(
        &self,
        event: AuditEvent,
    ) -> impl std::future::Future<Output = Result<(), AuditError>> + Send;
}
