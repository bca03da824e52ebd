//! Payment candidate validation and post-payment status derivation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use remit_shared::types::amount::has_at_most_two_decimals;

use crate::invoice::{Invoice, InvoiceStatus};
use crate::payment::error::PaymentError;
use crate::payment::types::{PaymentCandidate, PaymentTypeInfo};
use crate::tax::RoundingMode;

/// Stateless service for payment ledger rules.
///
/// Contains pure logic only; the repository supplies the remaining balance
/// observed under its row lock and persists the outcome.
pub struct PaymentService;

impl PaymentService {
    /// Validates a payment candidate against the invoice's remaining balance.
    ///
    /// The checks run in a fixed order and stop at the first failure:
    /// 1. payment date not in the future
    /// 2. amount positive, at most two decimal places
    /// 3. amount within the remaining balance
    /// 4. payment type active
    /// 5. reference present when the type requires it
    ///
    /// The remaining balance passed in must already net out credit notes;
    /// credit notes always apply before payments are considered.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a `PaymentError`.
    pub fn validate(
        candidate: &PaymentCandidate,
        remaining_balance: Decimal,
        today: NaiveDate,
        payment_type: &PaymentTypeInfo,
    ) -> Result<(), PaymentError> {
        if candidate.payment_date > today {
            return Err(PaymentError::DateInFuture(candidate.payment_date));
        }

        if candidate.amount_paid <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount);
        }
        if !has_at_most_two_decimals(candidate.amount_paid) {
            return Err(PaymentError::TooManyDecimalPlaces);
        }

        if candidate.amount_paid > remaining_balance {
            return Err(PaymentError::AmountExceedsBalance {
                remaining: remaining_balance,
            });
        }

        if !payment_type.is_active {
            return Err(PaymentError::PaymentTypeInactive(payment_type.id));
        }

        if payment_type.requires_reference
            && candidate
                .payment_reference
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
        {
            return Err(PaymentError::ReferenceRequired);
        }

        Ok(())
    }

    /// The withholding snapshot stored on the payment row.
    ///
    /// The candidate may override the invoice's sticky rounding preference
    /// for this one payment; the applied tax is re-derived under whichever
    /// mode wins, never read from a cache.
    #[must_use]
    pub fn withholding_snapshot(invoice: &Invoice, candidate: &PaymentCandidate) -> (Decimal, bool) {
        let rounded = candidate.tds_rounded.unwrap_or(invoice.withholding.rounded);
        let tax = invoice.withheld_tax_under(RoundingMode::from_flag(rounded));
        (tax, rounded)
    }

    /// Recomputes the invoice status from the balance after an insertion.
    ///
    /// Zero remaining means fully settled; a remainder strictly between
    /// zero and the net payable means partially settled; anything else
    /// leaves the current status untouched.
    #[must_use]
    pub fn status_after(
        net_payable: Decimal,
        remaining_after: Decimal,
        current: InvoiceStatus,
    ) -> InvoiceStatus {
        if remaining_after.is_zero() {
            InvoiceStatus::Paid
        } else if remaining_after < net_payable {
            InvoiceStatus::PartiallyPaid
        } else {
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use remit_shared::types::PaymentTypeId;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()
    }

    fn active_type() -> PaymentTypeInfo {
        PaymentTypeInfo {
            id: PaymentTypeId::new(),
            is_active: true,
            requires_reference: false,
        }
    }

    fn candidate(amount: Decimal) -> PaymentCandidate {
        PaymentCandidate {
            amount_paid: amount,
            payment_date: today(),
            payment_type_id: PaymentTypeId::new(),
            payment_reference: None,
            tds_rounded: None,
        }
    }

    #[test]
    fn test_valid_payment_passes() {
        let result =
            PaymentService::validate(&candidate(dec!(500)), dec!(900), today(), &active_type());
        assert!(result.is_ok());
    }

    #[test]
    fn test_future_date_rejected_first() {
        let mut c = candidate(dec!(-1)); // also invalid, but date wins
        c.payment_date = today() + chrono::Duration::days(1);
        let result = PaymentService::validate(&c, dec!(900), today(), &active_type());
        assert!(matches!(result, Err(PaymentError::DateInFuture(_))));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        for amount in [dec!(0), dec!(-10)] {
            let result =
                PaymentService::validate(&candidate(amount), dec!(900), today(), &active_type());
            assert!(matches!(result, Err(PaymentError::NonPositiveAmount)));
        }
    }

    #[test]
    fn test_sub_cent_precision_rejected() {
        let result =
            PaymentService::validate(&candidate(dec!(10.001)), dec!(900), today(), &active_type());
        assert!(matches!(result, Err(PaymentError::TooManyDecimalPlaces)));
    }

    #[test]
    fn test_amount_over_balance_names_remaining() {
        let result =
            PaymentService::validate(&candidate(dec!(901)), dec!(900), today(), &active_type());
        match result {
            Err(PaymentError::AmountExceedsBalance { remaining }) => {
                assert_eq!(remaining, dec!(900));
            }
            other => panic!("expected AmountExceedsBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_amount_equal_to_balance_passes() {
        let result =
            PaymentService::validate(&candidate(dec!(900)), dec!(900), today(), &active_type());
        assert!(result.is_ok());
    }

    #[test]
    fn test_inactive_type_rejected() {
        let mut ty = active_type();
        ty.is_active = false;
        let result = PaymentService::validate(&candidate(dec!(100)), dec!(900), today(), &ty);
        assert!(matches!(result, Err(PaymentError::PaymentTypeInactive(_))));
    }

    #[test]
    fn test_reference_required_when_type_demands() {
        let mut ty = active_type();
        ty.requires_reference = true;

        let result = PaymentService::validate(&candidate(dec!(100)), dec!(900), today(), &ty);
        assert!(matches!(result, Err(PaymentError::ReferenceRequired)));

        let mut c = candidate(dec!(100));
        c.payment_reference = Some("  ".to_string());
        let result = PaymentService::validate(&c, dec!(900), today(), &ty);
        assert!(matches!(result, Err(PaymentError::ReferenceRequired)));

        let mut c = candidate(dec!(100));
        c.payment_reference = Some("CHQ-2041".to_string());
        let result = PaymentService::validate(&c, dec!(900), today(), &ty);
        assert!(result.is_ok());
    }

    #[test]
    fn test_status_after_full_settlement() {
        let status = PaymentService::status_after(dec!(900), dec!(0), InvoiceStatus::Unpaid);
        assert_eq!(status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_status_after_partial_settlement() {
        let status = PaymentService::status_after(dec!(900), dec!(300), InvoiceStatus::Unpaid);
        assert_eq!(status, InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn test_status_unchanged_when_nothing_paid() {
        let status = PaymentService::status_after(dec!(900), dec!(900), InvoiceStatus::OnHold);
        assert_eq!(status, InvoiceStatus::OnHold);
    }
}
