//! Credit note candidate preparation.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::credit::error::CreditNoteError;
use crate::credit::types::{CreditNoteCandidate, PreparedCreditNote};
use crate::invoice::Invoice;

/// Stateless service for credit note rules.
pub struct CreditNoteService;

impl CreditNoteService {
    /// Validates a candidate and computes the proportional tax reversal.
    ///
    /// The amount must be positive and the reason non-blank; an amount
    /// exceeding the remaining balance is allowed and only flagged.
    ///
    /// # Errors
    ///
    /// Returns a `CreditNoteError` if the amount, reason, or date is invalid.
    pub fn prepare(
        candidate: &CreditNoteCandidate,
        invoice: &Invoice,
        remaining_balance: Decimal,
        today: NaiveDate,
    ) -> Result<PreparedCreditNote, CreditNoteError> {
        if candidate.amount <= Decimal::ZERO {
            return Err(CreditNoteError::NonPositiveAmount);
        }

        let reason = candidate.reason.trim();
        if reason.is_empty() {
            return Err(CreditNoteError::ReasonRequired);
        }

        if candidate.credit_note_date > today {
            return Err(CreditNoteError::DateInFuture(candidate.credit_note_date));
        }

        let reverse = candidate.reverse_tds && invoice.withholding.applicable;
        let tds_amount = if reverse {
            Self::reversed_tax(invoice.withheld_tax(), candidate.amount, invoice.net_payable())
        } else {
            Decimal::ZERO
        };

        Ok(PreparedCreditNote {
            amount: candidate.amount,
            reason: reason.to_string(),
            tds_applicable: reverse,
            tds_amount,
            credit_note_date: candidate.credit_note_date,
            attachment_id: candidate.attachment_id,
            exceeds_balance: candidate.amount > remaining_balance,
        })
    }

    /// Proportional reversal of previously withheld tax.
    ///
    /// `reversed = withheld * min(amount / net_payable, 1)`, rounded
    /// half-up to two decimal places. The cap means a credit note can
    /// never reverse more tax than was originally withheld, no matter how
    /// large the credited amount is.
    #[must_use]
    pub fn reversed_tax(withheld: Decimal, amount: Decimal, net_payable: Decimal) -> Decimal {
        let ratio = if net_payable <= Decimal::ZERO {
            Decimal::ONE
        } else {
            (amount / net_payable).min(Decimal::ONE)
        };

        (withheld * ratio).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
