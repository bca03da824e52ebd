//! Property-based tests for credit note tax reversal.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::credit::service::CreditNoteService;

/// Strategy for positive two-decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Reversed tax never exceeds the tax originally withheld, for any
    /// credit amount including amounts above the net payable.
    #[test]
    fn prop_reversal_never_exceeds_withheld(
        withheld in arb_amount(),
        amount in arb_amount(),
        net_payable in arb_amount()
    ) {
        let reversed = CreditNoteService::reversed_tax(withheld, amount, net_payable);
        // half-up rounding to 2dp cannot push past the cap because the
        // withheld input already has two decimal places
        prop_assert!(reversed <= withheld);
        prop_assert!(reversed >= Decimal::ZERO);
    }

    /// Crediting the full net payable reverses the full withheld amount.
    #[test]
    fn prop_full_credit_reverses_everything(
        withheld in arb_amount(),
        net_payable in arb_amount()
    ) {
        let reversed = CreditNoteService::reversed_tax(withheld, net_payable, net_payable);
        prop_assert_eq!(reversed, withheld);
    }

    /// Reversal scales monotonically with the credited amount.
    #[test]
    fn prop_reversal_is_monotone_in_amount(
        withheld in arb_amount(),
        net_payable in arb_amount(),
        a in arb_amount(),
        b in arb_amount()
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let r_lo = CreditNoteService::reversed_tax(withheld, lo, net_payable);
        let r_hi = CreditNoteService::reversed_tax(withheld, hi, net_payable);
        prop_assert!(r_lo <= r_hi);
    }
}
