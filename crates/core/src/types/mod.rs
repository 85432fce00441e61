//! Core types for Strivo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod size;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use quantity::{Quantity, QuantityError};
pub use size::{Size, SizeError};
