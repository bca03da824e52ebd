//! Invoice domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use remit_shared::types::{
    AttachmentId, CategoryId, CurrencyId, EntityId, InvoiceId, InvoiceProfileId, UserId, VendorId,
};

use crate::tax::{RoundingMode, withholding};

/// Invoice status in the financial lifecycle.
///
/// The valid transitions are:
/// - (new) → PendingApproval (standard-user create)
/// - (new) → Unpaid (admin create)
/// - (new) → Paid (paid-at-creation, any role)
/// - PendingApproval → Unpaid (approve) | Rejected (reject)
/// - Unpaid → PartiallyPaid → Paid (payments / credit notes)
/// - Unpaid | PartiallyPaid | Paid ⇄ OnHold (hold / release)
///
/// `Paid` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice is being drafted.
    Draft,
    /// Waiting for an administrator's approval.
    PendingApproval,
    /// Approved, nothing paid yet.
    Unpaid,
    /// Some, but not all, of the net payable has been settled.
    PartiallyPaid,
    /// Fully settled (terminal).
    Paid,
    /// Payments suspended by an administrator.
    OnHold,
    /// Rejected during approval (terminal).
    Rejected,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::OnHold => "on_hold",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_approval" => Some(Self::PendingApproval),
            "unpaid" => Some(Self::Unpaid),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "on_hold" => Some(Self::OnHold),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true for terminal states with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Rejected)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Withholding tax configuration carried by an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingConfig {
    /// Whether withholding applies to this invoice at all.
    pub applicable: bool,
    /// Percentage withheld (0-100); required iff `applicable`.
    pub percentage: Option<Decimal>,
    /// Sticky per-invoice rounding preference (ceiling when true).
    pub rounded: bool,
}

impl WithholdingConfig {
    /// A configuration with no withholding.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            applicable: false,
            percentage: None,
            rounded: false,
        }
    }

    /// The invoice's current rounding mode.
    #[must_use]
    pub const fn rounding_mode(&self) -> RoundingMode {
        RoundingMode::from_flag(self.rounded)
    }
}

/// How an invoice is bound to its master data.
///
/// Exactly one variant holds for the lifetime of the record: a recurring
/// invoice is pinned to a profile (which fixes vendor, entity, category,
/// currency, and a billing period); a standalone invoice carries those
/// references directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvoiceKind {
    /// One-off invoice carrying its own master-data references.
    Standard {
        /// Billing entity being invoiced.
        entity_id: EntityId,
        /// Expense category.
        category_id: CategoryId,
        /// Currency of the invoice amount.
        currency_id: CurrencyId,
        /// Free-text name/description; part of the duplicate scope.
        description: String,
    },
    /// Recurring invoice bound to a profile and billing period.
    Recurring {
        /// The profile fixing vendor/entity/category/currency.
        profile_id: InvoiceProfileId,
        /// Billing period start.
        period_start: NaiveDate,
        /// Billing period end (>= start).
        period_end: NaiveDate,
    },
}

impl InvoiceKind {
    /// Returns true for the recurring variant.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        matches!(self, Self::Recurring { .. })
    }
}

/// Rejection metadata recorded when an approval is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Reason given by the rejecting administrator (trimmed, >= 10 chars).
    pub reason: String,
    /// Who rejected.
    pub rejected_by: UserId,
    /// When.
    pub rejected_at: DateTime<Utc>,
}

/// Hold metadata recorded when payments are suspended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Reason given by the administrator.
    pub reason: String,
    /// Who placed the hold.
    pub held_by: UserId,
    /// When.
    pub held_at: DateTime<Utc>,
}

/// Soft-delete lifecycle flag.
///
/// An invoice is either visible, or hidden with a recovery deadline. The
/// purge sweep only ever touches `Hidden` records whose deadline has
/// elapsed, which keeps the sweep trivially idempotent: a record it cannot
/// find any more needs no work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Tombstone {
    /// Visible, normal lifecycle.
    Active,
    /// Soft-deleted; recoverable until the deadline passes.
    Hidden {
        /// Who hid the invoice.
        hidden_by: UserId,
        /// When it was hidden.
        hidden_at: DateTime<Utc>,
        /// Optional reason supplied at deletion time.
        reason: Option<String>,
        /// Deletion timestamp the deadline is computed from.
        deleted_at: DateTime<Utc>,
        /// `deleted_at` plus the configured retention window.
        recovery_deadline: DateTime<Utc>,
    },
}

impl Tombstone {
    /// Returns true when the invoice is soft-deleted.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden { .. })
    }

    /// Returns true when the record is hidden and past its deadline.
    #[must_use]
    pub fn is_purgeable(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Active => false,
            Self::Hidden {
                recovery_deadline, ..
            } => *recovery_deadline <= now,
        }
    }
}

/// An invoice record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: InvoiceId,
    /// Free-text invoice number; uniqueness is scoped, see the orchestrator.
    pub invoice_number: String,
    /// Vendor the invoice was received from.
    pub vendor_id: VendorId,
    /// Profile binding or direct master-data references.
    pub kind: InvoiceKind,
    /// Date on the vendor's document.
    pub invoice_date: NaiveDate,
    /// Payment due date (>= `invoice_date`).
    pub due_date: NaiveDate,
    /// Gross amount (> 0).
    pub amount: Decimal,
    /// Withholding configuration.
    pub withholding: WithholdingConfig,
    /// Current lifecycle status.
    pub status: InvoiceStatus,
    /// Rejection metadata, if rejected.
    pub rejection: Option<Rejection>,
    /// Hold metadata, if on hold.
    pub hold: Option<Hold>,
    /// Soft-delete flag.
    pub tombstone: Tombstone,
    /// Reference to the backing document, when one was uploaded.
    pub attachment_id: Option<AttachmentId>,
    /// Who created the invoice.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp; doubles as the optimistic-concurrency token.
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// The tax withheld from this invoice under its current rounding mode.
    ///
    /// Zero when withholding does not apply.
    #[must_use]
    pub fn withheld_tax(&self) -> Decimal {
        self.withheld_tax_under(self.withholding.rounding_mode())
    }

    /// The tax withheld under an explicit rounding mode.
    ///
    /// Used by the payment path, where the caller may override the
    /// invoice's sticky preference for a single payment.
    #[must_use]
    pub fn withheld_tax_under(&self, mode: RoundingMode) -> Decimal {
        if !self.withholding.applicable {
            return Decimal::ZERO;
        }
        let percentage = self.withholding.percentage.unwrap_or(Decimal::ZERO);
        withholding(self.amount, percentage, mode).tax
    }

    /// Gross amount minus withheld tax, under the current rounding mode.
    #[must_use]
    pub fn net_payable(&self) -> Decimal {
        self.amount - self.withheld_tax()
    }
}
