//! Monetary arithmetic helpers
//!
//! Prices, shares and discounts are carried as `rust_decimal::Decimal` so
//! that percentage splits never accumulate floating-point error. This module
//! holds the few operations every calculation needs: rounding to the billing
//! precision, clamping at zero, and applying percentage rates.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places amounts are billed in
pub const DEFAULT_MONEY_DP: u32 = 2;

/// Rounds an amount to `dp` decimal places, half away from zero
pub fn round_money(amount: Decimal, dp: u32) -> Decimal {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps an amount at zero
pub fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Multiplies a per-unit amount by a quantity
pub fn extend(unit_amount: Decimal, quantity: u32) -> Decimal {
    unit_amount * Decimal::from(quantity)
}

/// Represents a percentage rate (coverage, discount, default split)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// The zero rate
    pub const ZERO: Rate = Rate { value: Decimal::ZERO };

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to an amount
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount * self.value
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(10.005), 2), dec!(10.01));
        assert_eq!(round_money(dec!(10.004), 2), dec!(10.00));
        assert_eq!(round_money(dec!(-10.005), 2), dec!(-10.01));
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(dec!(-3.50)), Decimal::ZERO);
        assert_eq!(non_negative(dec!(3.50)), dec!(3.50));
    }

    #[test]
    fn test_extend() {
        assert_eq!(extend(dec!(12.50), 4), dec!(50.00));
        assert_eq!(extend(dec!(12.50), 0), Decimal::ZERO);
    }

    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(70));
        assert_eq!(rate.apply(dec!(300)), dec!(210));
        assert_eq!(rate.to_string(), "70%");
    }

    #[test]
    fn test_zero_rate() {
        assert_eq!(Rate::ZERO.apply(dec!(300)), Decimal::ZERO);
        assert_eq!(Rate::ZERO.as_percentage(), Decimal::ZERO);
    }
}
