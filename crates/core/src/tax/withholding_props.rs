//! Property-based tests for the withholding calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::tax::withholding::{RoundingMode, withholding};

/// Strategy for gross amounts: positive, two decimal places, up to 10M.
fn arb_gross() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for percentages: 0-100 with up to two decimal places.
fn arb_percentage() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Under the exact mode the split is lossless: net + tax == gross.
    #[test]
    fn prop_exact_split_is_lossless(
        gross in arb_gross(),
        percentage in arb_percentage()
    ) {
        let w = withholding(gross, percentage, RoundingMode::Exact);
        prop_assert_eq!(w.net_payable + w.tax, gross);
    }

    /// Ceiling the tax can only shrink the net payable.
    #[test]
    fn prop_rounded_net_never_exceeds_exact_net(
        gross in arb_gross(),
        percentage in arb_percentage()
    ) {
        let exact = withholding(gross, percentage, RoundingMode::Exact);
        let rounded = withholding(gross, percentage, RoundingMode::Rounded);
        prop_assert!(rounded.net_payable <= exact.net_payable);
    }

    /// The ceiling adds strictly less than one whole currency unit.
    #[test]
    fn prop_rounding_adds_less_than_one_unit(
        gross in arb_gross(),
        percentage in arb_percentage()
    ) {
        let exact = withholding(gross, percentage, RoundingMode::Exact);
        let rounded = withholding(gross, percentage, RoundingMode::Rounded);
        let delta = rounded.tax - exact.tax;
        prop_assert!(delta >= Decimal::ZERO);
        prop_assert!(delta < Decimal::ONE);
    }

    /// Tax is never negative and never exceeds the gross amount.
    #[test]
    fn prop_tax_within_bounds(
        gross in arb_gross(),
        percentage in arb_percentage()
    ) {
        for mode in [RoundingMode::Exact, RoundingMode::Rounded] {
            let w = withholding(gross, percentage, mode);
            prop_assert!(w.tax >= Decimal::ZERO);
            // percentage <= 100 means exact tax <= gross; the ceiling can
            // push at most up to the next unit above the exact figure
            prop_assert!(w.tax <= gross.ceil());
        }
    }
}
