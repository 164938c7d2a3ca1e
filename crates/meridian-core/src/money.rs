//! Integer money and commission rates.
//!
//! Every amount is stored and sent in minor units (`*_cents` fields,
//! INTEGER columns) so dashboard revenue can be summed exactly in SQL.
//! Decimal strings only appear when a value is rendered for a log line.
//!
//! ```rust
//! use meridian_core::money::{Money, Rate};
//!
//! let line = Money::from_cents(799_900) * 2;
//! assert_eq!(line.to_string(), "15998.00");
//! assert_eq!(Rate::from_bps(550).to_string(), "5.50%");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

/// An amount in cents. Serializes as a bare integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Ten billion in major units; larger amounts are rejected as input so
    /// sums and line totals stay well inside `i64`.
    pub const MAX_CENTS: i64 = 1_000_000_000_000;

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `None` on `i64` overflow.
    #[inline]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

/// `12.99`, no currency symbol; channels sell in their platform's currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Unit price times quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

/// A channel commission in basis points: `550` is 5.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// 100%.
    pub const MAX_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_line_totals_sum() {
        let total: Money = [(99_900, 2), (1_500, 3)]
            .into_iter()
            .map(|(unit, qty)| Money::from_cents(unit) * qty)
            .sum();
        assert_eq!(total.cents(), 204_300);
    }

    #[test]
    fn test_checked_add() {
        let half = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(half.checked_add(half), None);
        assert_eq!(
            Money::from_cents(Money::MAX_CENTS).checked_add(Money::from_cents(1)),
            Some(Money::from_cents(Money::MAX_CENTS + 1))
        );
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Money::from_cents(1299)).unwrap(), "1299");

        let rate: Rate = serde_json::from_str("550").unwrap();
        assert_eq!(rate.bps(), 550);
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::from_bps(550).to_string(), "5.50%");
        assert_eq!(Rate::from_bps(Rate::MAX_BPS).to_string(), "100.00%");
    }
}
