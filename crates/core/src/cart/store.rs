//! The persisted cart.

use std::sync::Arc;

use tracing::{debug, warn};

use super::codec::{self, Format};
use super::{Cart, CartError, CartEvent, CartLine, CartSummary};
use crate::catalog::Catalog;
use crate::storage::{SlotStorage, StorageError};
use crate::types::{LineId, Price, ProductId, Quantity, Size};

/// Slot key used when none is configured.
pub const DEFAULT_SLOT_KEY: &str = "strivo_cart";

/// Outcome of a successful mutation.
///
/// The mutation is always applied to the in-memory cart. `warning` is set
/// when persisting it afterwards failed.
#[derive(Debug)]
pub struct Mutation {
    pub event: CartEvent,
    pub warning: Option<StorageError>,
}

impl Mutation {
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// A cart bound to its storage slot and catalog.
///
/// Every mutation writes the whole cart back to the slot.
#[derive(Debug)]
pub struct CartStore<S: SlotStorage> {
    cart: Cart,
    storage: S,
    key: String,
    catalog: Arc<Catalog>,
}

impl<S: SlotStorage> CartStore<S> {
    /// Restore the cart stored under `key`.
    ///
    /// Never fails: a missing slot gives an empty cart, and an unreadable or
    /// malformed one is logged and also gives an empty cart. Lines whose
    /// product left the catalog are dropped, and stored sizes are normalized
    /// the same way [`CartStore::add`] does.
    pub fn load(storage: S, key: impl Into<String>, catalog: Arc<Catalog>) -> Self {
        let key = key.into();
        let mut cart = match storage.read(&key) {
            Ok(Some(raw)) => match codec::decode(&raw) {
                Ok(decoded) => {
                    if decoded.format == Format::Legacy {
                        debug!(slot = %key, lines = decoded.cart.len(), "Migrated legacy cart");
                    }
                    if decoded.dropped > 0 {
                        warn!(slot = %key, dropped = decoded.dropped, "Dropped stored cart lines with invalid quantity");
                    }
                    decoded.cart
                }
                Err(e) => {
                    warn!(slot = %key, error = %e, "Stored cart is malformed, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(slot = %key, error = %e, "Failed to read cart slot, starting empty");
                Cart::new()
            }
        };

        let unknown = cart.retain_known(&catalog);
        if !unknown.is_empty() {
            warn!(slot = %key, dropped = unknown.len(), "Dropped cart lines for products no longer in the catalog");
        }

        let normalized: Vec<CartLine> = cart
            .lines()
            .iter()
            .map(|line| CartLine {
                size: catalog
                    .get(line.product_id)
                    .map_or(line.size, |product| product.effective_size(line.size)),
                ..*line
            })
            .collect();
        if normalized.as_slice() != cart.lines() {
            debug!(slot = %key, "Normalized stored cart sizes");
            cart = Cart::from_parts(normalized, cart.next_line_id());
        }

        Self {
            cart,
            storage,
            key,
            catalog,
        }
    }

    /// Write the cart to its slot.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the storage write fails.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let encoded = codec::encode(&self.cart)?;
        self.storage.write(&self.key, &encoded)
    }

    fn persist(&mut self, event: CartEvent) -> Mutation {
        let warning = self.save().err();
        if let Some(e) = &warning {
            warn!(slot = %self.key, error = %e, "Failed to persist cart");
        }
        Mutation { event, warning }
    }

    /// Add `quantity` units of a product.
    ///
    /// The size is normalized for the product: unsized products never carry
    /// one and sized products default to [`Size::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if the product is not in the
    /// catalog.
    pub fn add(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
        size: Option<Size>,
    ) -> Result<Mutation, CartError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or(CartError::UnknownProduct(product_id))?;
        let size = product.effective_size(size);
        let event = self.cart.add(product_id, quantity, size);
        Ok(self.persist(event))
    }

    /// Overwrite a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if `index` is out of range.
    pub fn update_quantity(&mut self, index: usize, new_quantity: i64) -> Result<Mutation, CartError> {
        let event = self.cart.update_quantity(index, new_quantity)?;
        Ok(self.persist(event))
    }

    /// Delete the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<Mutation, CartError> {
        let event = self.cart.remove(index)?;
        Ok(self.persist(event))
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> Mutation {
        let event = self.cart.clear();
        self.persist(event)
    }

    /// Resolve a line identifier to its current index.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] if no line has that identifier.
    pub fn position(&self, line_id: LineId) -> Result<usize, CartError> {
        self.cart
            .position(line_id)
            .ok_or(CartError::UnknownLine(line_id))
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total(&self.catalog)
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::project(&self.cart, &self.catalog)
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Give back the storage, e.g. to flush a buffered backend.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
