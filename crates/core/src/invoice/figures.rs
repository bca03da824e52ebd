//! Derived balance figures for an invoice.
//!
//! Every consumer (list views, detail payloads, the payment ledger's
//! balance check) derives its numbers through `InvoiceFigures::derive`,
//! so no two read sites can ever disagree on what an invoice owes.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::credit::types::CreditNote;
use crate::invoice::types::Invoice;
use crate::payment::types::Payment;

/// The derived, never-stored financial figures of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceFigures {
    /// Gross minus withheld tax under the invoice's current rounding mode.
    pub net_payable: Decimal,
    /// Sum of all recorded payments.
    pub total_paid: Decimal,
    /// Sum of all recorded credit notes.
    pub total_credited: Decimal,
    /// `max(0, net_payable - total_paid - total_credited)`.
    pub remaining_balance: Decimal,
}

impl InvoiceFigures {
    /// Derives the figures from the invoice and its child ledgers.
    ///
    /// Credit notes net out alongside payments; the remaining balance is
    /// clamped at zero so an over-credited invoice reads as settled rather
    /// than negative.
    #[must_use]
    pub fn derive(invoice: &Invoice, payments: &[Payment], credit_notes: &[CreditNote]) -> Self {
        let net_payable = invoice.net_payable();
        let total_paid: Decimal = payments.iter().map(|p| p.amount_paid).sum();
        let total_credited: Decimal = credit_notes.iter().map(|c| c.amount).sum();

        Self {
            net_payable,
            total_paid,
            total_credited,
            remaining_balance: (net_payable - total_paid - total_credited).max(Decimal::ZERO),
        }
    }

    /// The status these figures imply on their own.
    ///
    /// Zero remaining means settled; a remainder strictly below the net
    /// payable means partially settled; a full remainder means unpaid.
    /// Used when lifting a hold, where status is recomputed purely from
    /// the balance.
    #[must_use]
    pub fn settlement_status(&self) -> crate::invoice::InvoiceStatus {
        use crate::invoice::InvoiceStatus;

        if self.remaining_balance.is_zero() {
            InvoiceStatus::Paid
        } else if self.remaining_balance < self.net_payable {
            InvoiceStatus::PartiallyPaid
        } else {
            InvoiceStatus::Unpaid
        }
    }
}
