//! CLI subcommand implementations.
//!
//! Commands write their report to the given writer so they can be exercised
//! against a buffer in tests.

pub mod cart;
pub mod catalog;
pub mod subscribe;

use strivo_core::{CartError, CatalogError, ProductId, ValidationErrors};
use thiserror::Error;

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Subscription(#[from] ValidationErrors),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
