//! Decimal amount helpers for money validation.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal`.

use rust_decimal::Decimal;

/// Maximum decimal places accepted for monetary input.
pub const MONEY_SCALE: u32 = 2;

/// Returns true if the amount carries at most two decimal places.
///
/// Payment and credit amounts are entered in whole currency units plus
/// cents; anything finer is a data-entry error, not a rounding artifact.
#[must_use]
pub fn has_at_most_two_decimals(amount: Decimal) -> bool {
    amount.round_dp(MONEY_SCALE) == amount
}

/// Returns true if the value is a valid withholding percentage (0-100 inclusive).
#[must_use]
pub fn is_valid_percentage(percentage: Decimal) -> bool {
    percentage >= Decimal::ZERO && percentage <= Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_two_decimals_accepted() {
        assert!(has_at_most_two_decimals(dec!(100)));
        assert!(has_at_most_two_decimals(dec!(100.5)));
        assert!(has_at_most_two_decimals(dec!(100.55)));
        assert!(has_at_most_two_decimals(dec!(0.01)));
    }

    #[test]
    fn test_three_decimals_rejected() {
        assert!(!has_at_most_two_decimals(dec!(100.555)));
        assert!(!has_at_most_two_decimals(dec!(0.001)));
    }

    #[test]
    fn test_trailing_zeros_are_fine() {
        // 1.250 normalizes to scale 2 under round_dp
        assert!(has_at_most_two_decimals(dec!(1.250)));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(is_valid_percentage(dec!(0)));
        assert!(is_valid_percentage(dec!(10.5)));
        assert!(is_valid_percentage(dec!(100)));
        assert!(!is_valid_percentage(dec!(-0.01)));
        assert!(!is_valid_percentage(dec!(100.01)));
    }
}
