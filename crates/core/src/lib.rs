//! Strivo Core - catalog, cart and validation library.
//!
//! This crate provides the storefront's domain logic, shared by:
//! - `storefront` - Public-facing web storefront
//! - `cli` - Command-line cart and catalog tools
//!
//! # Architecture
//!
//! The core crate contains no HTTP and no async code. Persistence goes through
//! the [`storage::SlotStorage`] trait, so the same cart store runs against a
//! browser session, a JSON file, or an in-memory map.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, sizes and emails
//! - [`catalog`] - The static product catalog
//! - [`cart`] - Cart lines, the cart store, its persisted format and projection
//! - [`storage`] - Key-value slot storage
//! - [`subscription`] - Subscription form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod storage;
pub mod subscription;
pub mod types;

pub use cart::{
    Cart, CartError, CartEvent, CartLine, CartStore, CartSummary, DEFAULT_SLOT_KEY, LineSummary,
    Mutation,
};
pub use catalog::{Catalog, CatalogError, CategoryFilter, Product};
pub use storage::{MemoryStorage, SlotStorage, StorageError};
pub use subscription::{Field, Subscription, SubscriptionInput, ValidationError, ValidationErrors};
pub use types::*;
