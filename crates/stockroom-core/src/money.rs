//! # Money Module
//!
//! Provides the `Money` type for handling peso amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The documents in the database store prices as JavaScript numbers:     │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │                                                                         │
//! │  Summing thousands of order totals that way drifts the dashboard.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Amounts are rounded to centavos ONCE, at the ingestion boundary,   │
//! │    and every sum/product after that is exact integer math.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Saturation
//! The aggregators must never panic on odd input, so every arithmetic
//! operation here saturates at the `i64` bounds instead of overflowing.
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_centavos(1099); // ₱10.99
//! let line = price * 3;                    // ₱32.97
//! assert_eq!(line.centavos(), 3297);
//! assert_eq!(line.to_string(), "₱32.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Currency symbol used by [`Money`]'s `Display` implementation.
pub const CURRENCY_SYMBOL: &str = "₱";

// =============================================================================
// Money Type
// =============================================================================

/// A peso amount in centavos (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: loss amounts and variance math can go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as centavos**: the display layer divides by 100
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  item.price ──┬──► price × current_stock ──► total_value, buckets       │
/// │               ├──► price × usage ─────────► top performing items        │
/// │               └──► loss unit cost ────────► total_lost_amount           │
/// │                                                                         │
/// │  order.total ──► total_sales, sales report revenue                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_centavos(1099); // ₱10.99
    /// assert_eq!(price.centavos(), 1099);
    /// ```
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos.saturating_mul(100))
    }

    /// Converts a decimal peso amount (as stored in documents) to centavos.
    ///
    /// Rounds half away from zero. Non-finite input becomes zero and values
    /// beyond the `i64` range saturate. Only the ingestion boundary should
    /// need this; everything downstream stays in integers.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(150.5).centavos(), 15050);
    /// assert_eq!(Money::from_decimal(19.999).centavos(), 2000);
    /// assert_eq!(Money::from_decimal(f64::NAN), Money::zero());
    /// ```
    pub fn from_decimal(pesos: f64) -> Self {
        if !pesos.is_finite() {
            return Money::zero();
        }
        // `as` saturates for out-of-range floats
        Money((pesos * 100.0).round() as i64)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion (truncated toward zero).
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity (stock level, usage, line quantity).
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_pesos(50);
    /// assert_eq!(price.multiply_quantity(25), Money::from_pesos(1250));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Divides a total evenly over `count` entries, rounding half away from
    /// zero. Returns zero when `count` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let revenue = Money::from_centavos(1000);
    /// assert_eq!(revenue.average_over(3).centavos(), 333);
    /// assert_eq!(revenue.average_over(0), Money::zero());
    /// ```
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        let total = self.0 as i128;
        let count = count as i128;
        let half = if total < 0 { -(count / 2) } else { count / 2 };
        Money(((total + half) / count) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as "₱1250.00". Locale-aware grouping is left to the screens.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            CURRENCY_SYMBOL,
            self.pesos().unsigned_abs(),
            self.centavos_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pesos_and_parts() {
        let money = Money::from_pesos(12);
        assert_eq!(money.centavos(), 1200);

        let money = Money::from_centavos(1099);
        assert_eq!(money.pesos(), 10);
        assert_eq!(money.centavos_part(), 99);
    }

    #[test]
    fn test_from_decimal_rounding() {
        assert_eq!(Money::from_decimal(49.5).centavos(), 4950);
        assert_eq!(Money::from_decimal(19.999).centavos(), 2000);
        assert_eq!(Money::from_decimal(-0.125).centavos(), -13);
        assert_eq!(Money::from_decimal(f64::INFINITY), Money::zero());
        assert_eq!(Money::from_decimal(1e300).centavos(), i64::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_centavos(125000).to_string(), "₱1250.00");
        assert_eq!(Money::from_centavos(5).to_string(), "₱0.05");
        assert_eq!(Money::from_centavos(-550).to_string(), "-₱5.50");
        assert_eq!(Money::zero().to_string(), "₱0.00");
    }

    #[test]
    fn test_arithmetic_saturates() {
        let a = Money::from_centavos(1000);
        let b = Money::from_centavos(500);
        assert_eq!((a + b).centavos(), 1500);
        assert_eq!((a - b).centavos(), 500);
        assert_eq!((a * 3).centavos(), 3000);

        let huge = Money::from_centavos(i64::MAX);
        assert_eq!((huge + a).centavos(), i64::MAX);
        assert_eq!(huge.multiply_quantity(2).centavos(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_decimal(150.5), Money::from_decimal(49.5)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_pesos(200));
    }

    #[test]
    fn test_average_over_rounds_half_away_from_zero() {
        assert_eq!(Money::from_centavos(3).average_over(2).centavos(), 2);
        assert_eq!(Money::from_centavos(-3).average_over(2).centavos(), -2);
        assert_eq!(Money::from_centavos(2).average_over(3).centavos(), 1);
        assert_eq!(Money::from_centavos(1).average_over(3).centavos(), 0);
    }

    #[test]
    fn test_serializes_as_centavos() {
        let json = serde_json::to_string(&Money::from_pesos(3)).unwrap();
        assert_eq!(json, "300");
    }
}
