//! Withholding tax amount and net payable derivation.
//!
//! The withheld amount is always re-derived at the call site from the gross
//! amount and the caller's current rounding preference. It is never cached:
//! the preference can flip per payment, and a cached figure computed under
//! the other mode would disagree with what the payer actually owes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the withheld tax amount is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// No rounding; the exact fractional tax is withheld.
    Exact,
    /// Tax is rounded up to the next whole currency unit (ceiling).
    ///
    /// Always up, never down, so the payer can never underpay the
    /// statutory withholding.
    Rounded,
}

impl RoundingMode {
    /// Maps the stored boolean preference onto a mode.
    #[must_use]
    pub const fn from_flag(rounded: bool) -> Self {
        if rounded { Self::Rounded } else { Self::Exact }
    }

    /// Returns true for the ceiling mode.
    #[must_use]
    pub const fn is_rounded(self) -> bool {
        matches!(self, Self::Rounded)
    }
}

/// Result of a withholding calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withholding {
    /// The withheld tax amount under the requested rounding mode.
    pub tax: Decimal,
    /// Gross amount minus the withheld tax.
    pub net_payable: Decimal,
}

/// Computes the withheld tax and net payable for a gross amount.
///
/// `percentage` is a plain percentage in the 0-100 range;
/// `tax_exact = gross * percentage / 100`. Under `RoundingMode::Rounded`
/// the tax is ceiled to the next whole currency unit.
///
/// A zero percentage yields zero tax and `net_payable == gross` under
/// either mode. Callers skip this function entirely when withholding does
/// not apply to the invoice.
#[must_use]
pub fn withholding(gross: Decimal, percentage: Decimal, mode: RoundingMode) -> Withholding {
    if percentage.is_zero() {
        return Withholding {
            tax: Decimal::ZERO,
            net_payable: gross,
        };
    }

    let exact = gross * percentage / Decimal::ONE_HUNDRED;
    let tax = match mode {
        RoundingMode::Exact => exact,
        RoundingMode::Rounded => exact.ceil(),
    };

    Withholding {
        tax,
        net_payable: gross - tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_mode_preserves_fraction() {
        let w = withholding(dec!(1000), dec!(10), RoundingMode::Exact);
        assert_eq!(w.tax, dec!(100));
        assert_eq!(w.net_payable, dec!(900));
    }

    #[test]
    fn test_rounded_mode_ceils_tax() {
        // 333 * 10.5% = 34.965 -> 35
        let w = withholding(dec!(333), dec!(10.5), RoundingMode::Rounded);
        assert_eq!(w.tax, dec!(35));
        assert_eq!(w.net_payable, dec!(298));
    }

    #[test]
    fn test_rounded_mode_leaves_whole_tax_alone() {
        // 1000 * 10.5% = 105.00 exactly, nothing to ceil
        let w = withholding(dec!(1000), dec!(10.5), RoundingMode::Rounded);
        assert_eq!(w.tax, dec!(105));
        assert_eq!(w.net_payable, dec!(895));
    }

    #[test]
    fn test_zero_percentage_is_identity() {
        for mode in [RoundingMode::Exact, RoundingMode::Rounded] {
            let w = withholding(dec!(1234.56), dec!(0), mode);
            assert_eq!(w.tax, Decimal::ZERO);
            assert_eq!(w.net_payable, dec!(1234.56));
        }
    }

    #[test]
    fn test_exact_fraction_survives() {
        let w = withholding(dec!(333), dec!(10.5), RoundingMode::Exact);
        assert_eq!(w.tax, dec!(34.965));
        assert_eq!(w.net_payable, dec!(298.035));
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(RoundingMode::from_flag(true), RoundingMode::Rounded);
        assert_eq!(RoundingMode::from_flag(false), RoundingMode::Exact);
        assert!(RoundingMode::Rounded.is_rounded());
        assert!(!RoundingMode::Exact.is_rounded());
    }
}
