//! Line-item quantities.
//!
//! A [`Quantity`] is always at least one, so a cart line can never hold a
//! zero or negative amount. Requests that would drive a line to zero are
//! expressed as removals by the cart instead.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The value does not fit in a quantity.
    #[error("quantity {0} is too large")]
    TooLarge(i64),
}

/// A positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Smallest quantity the product modal accepts.
    pub const MODAL_MIN: u32 = 1;

    /// Largest quantity the product modal accepts.
    pub const MODAL_MAX: u32 = 10;

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The count as a plain integer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }

    /// Interpret raw quantity input from the product modal.
    ///
    /// Non-numeric input and values below 1 become 1; values above 10
    /// become 10.
    #[must_use]
    pub fn from_modal_input(raw: &str) -> Self {
        let value = raw
            .trim()
            .parse::<i64>()
            .unwrap_or(i64::from(Self::MODAL_MIN))
            .clamp(i64::from(Self::MODAL_MIN), i64::from(Self::MODAL_MAX));
        Self::try_from(value).unwrap_or(Self::ONE)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(QuantityError::NotPositive(value));
        }
        let value = u32::try_from(value).map_err(|_| QuantityError::TooLarge(value))?;
        Self::new(value).ok_or(QuantityError::NotPositive(0))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
