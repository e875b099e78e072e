//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are fixed-point [`Decimal`] values in the store currency's standard
//! unit (dollars, not cents), so summing many line items never drifts the way
//! binary floating point does.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// A monetary amount in the store currency.
///
/// Deserializes from either a JSON number (`499.99`) or a numeric string
/// (`"499.99"`), since the catalog API sends both. Serializes as a string
/// to preserve precision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The line price for `quantity` units at this price.
    ///
    /// Saturates at [`Decimal::MAX`] instead of panicking on overflow.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity.get()))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    /// Formats for display with two decimal places (e.g., `$19.99`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("499.99").unwrap();
        let from_string: Price = serde_json::from_str("\"499.99\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number, Price::from_cents(49_999));
    }

    #[test]
    fn test_times_quantity() {
        let price = Price::from_cents(1_050);
        assert_eq!(price.times(Quantity::clamped(3)), Price::from_cents(3_150));
    }

    #[test]
    fn test_sum_has_no_float_drift() {
        // 0.1 summed ten times is exactly 1.00 in decimal arithmetic
        let total: Price = std::iter::repeat_n(Price::from_cents(10), 10).sum();
        assert_eq!(total, Price::from_cents(100));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1_999).to_string(), "$19.99");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
        assert_eq!(Price::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_cents(1).is_negative());
    }
}
