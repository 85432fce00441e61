//! Cart errors.

use thiserror::Error;

use crate::types::{LineId, ProductId};

/// Errors returned by cart operations.
///
/// Every variant is a caller error; the cart is left unchanged when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A line index was out of range.
    #[error("no cart line at index {index} (cart has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// A line identifier does not name a line in the cart.
    #[error("cart line {0} not found")]
    UnknownLine(LineId),

    /// The product is not in the catalog.
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),
}
