//! Type-safe price representation in Colombian pesos.
//!
//! Prices are whole pesos, the smallest unit the catalog uses, so all
//! arithmetic is integer arithmetic. Display follows the `es-CO` currency
//! format: a `$` sign, a non-breaking space, and `.` as thousands separator
//! (`$ 159.900`).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

use super::Quantity;

/// A non-negative amount in Colombian pesos.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Zero pesos.
    pub const ZERO: Self = Self(0);

    /// Create a new price from a peso amount.
    #[must_use]
    pub const fn new(pesos: u64) -> Self {
        Self(pesos)
    }

    /// The amount in pesos.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// The price of `quantity` units.
    ///
    /// Saturates instead of wrapping so the cart total stays a total function.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity.get())))
    }

    /// Format for display (e.g., "$ 159.900").
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "$\u{a0}{grouped}")
    }
}

impl From<u64> for Price {
    fn from(pesos: u64) -> Self {
        Self(pesos)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(0).display(), "$\u{a0}0");
        assert_eq!(Price::new(999).display(), "$\u{a0}999");
        assert_eq!(Price::new(1_000).display(), "$\u{a0}1.000");
        assert_eq!(Price::new(159_900).display(), "$\u{a0}159.900");
        assert_eq!(Price::new(1_249_900).display(), "$\u{a0}1.249.900");
    }

    #[test]
    fn test_times() {
        let quantity = Quantity::new(3).unwrap();
        assert_eq!(Price::new(89_900).times(quantity), Price::new(269_700));
        assert_eq!(Price::new(u64::MAX).times(quantity), Price::new(u64::MAX));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::new(100), Price::new(250)].into_iter().sum();
        assert_eq!(total, Price::new(350));

        let empty: Price = core::iter::empty().sum();
        assert_eq!(empty, Price::ZERO);
    }
}
