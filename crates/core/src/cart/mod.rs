//! The shopping cart.
//!
//! [`Cart`] is the pure line list: every operation is a function from the
//! current lines to the new lines plus a [`CartEvent`] describing the change.
//! [`CartStore`] wraps a cart with its catalog and storage slot and persists
//! after every mutation. [`CartSummary`] is the read-only projection the
//! display layers render from.
//!
//! # Invariants
//!
//! - At most one line per (product, size) pair; adding an existing pair
//!   increases that line's quantity.
//! - Every line's quantity is at least one. Updating a line to zero or less
//!   removes it.
//! - Line identifiers are unique within a cart and never reused.

pub mod codec;
mod error;
mod store;
mod summary;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::types::{LineId, Price, ProductId, Quantity, Size};

pub use error::CartError;
pub use store::{CartStore, DEFAULT_SLOT_KEY, Mutation};
pub use summary::{CartSummary, LineSummary};

/// One (product, size) pairing in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Stable identifier, unaffected by removals of other lines.
    pub id: LineId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub size: Option<Size>,
}

impl CartLine {
    /// Whether this line holds the given (product, size) pair.
    #[must_use]
    pub fn matches(&self, product_id: ProductId, size: Option<Size>) -> bool {
        self.product_id == product_id && self.size == size
    }
}

/// What a cart mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new line was appended.
    LineAdded { line_id: LineId, index: usize },
    /// An existing line absorbed an add.
    QuantityIncreased {
        line_id: LineId,
        index: usize,
        quantity: Quantity,
    },
    /// A line's quantity was overwritten.
    QuantityChanged {
        line_id: LineId,
        index: usize,
        quantity: Quantity,
    },
    /// A line was deleted; later lines shifted down by one.
    LineRemoved { line: CartLine, index: usize },
    /// Every line was deleted.
    Cleared { removed: usize },
}

/// An ordered list of cart lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    next_line_id: LineId,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            next_line_id: LineId::FIRST,
        }
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines, restoring the invariants.
    ///
    /// Lines repeating an earlier (product, size) pair are merged into it,
    /// repeated line ids are reassigned, and the id counter is moved past
    /// every id in use. When the counter would reach [`LineId::MAX`] the
    /// lines are renumbered from [`LineId::FIRST`].
    #[must_use]
    pub fn from_parts(lines: Vec<CartLine>, next_line_id: LineId) -> Self {
        let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
        for line in lines {
            match merged
                .iter_mut()
                .find(|existing| existing.matches(line.product_id, line.size))
            {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => merged.push(line),
            }
        }

        let mut next = merged
            .iter()
            .map(|line| line.id.next())
            .max()
            .map_or(next_line_id, |after_max| after_max.max(next_line_id))
            .max(LineId::FIRST);

        let mut seen = HashSet::with_capacity(merged.len());
        for line in &mut merged {
            if !seen.insert(line.id) {
                line.id = next;
                seen.insert(next);
                next = next.next();
            }
        }

        if next == LineId::MAX {
            next = renumber(&mut merged);
        }

        Self {
            lines: merged,
            next_line_id: next,
        }
    }

    /// The lines, in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line at `index`.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    /// The identifier the next new line will receive.
    #[must_use]
    pub const fn next_line_id(&self) -> LineId {
        self.next_line_id
    }

    /// Current index of the line with the given identifier.
    #[must_use]
    pub fn position(&self, line_id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == line_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of `price × quantity` across all lines.
    ///
    /// Lines whose product is missing from `catalog` contribute nothing.
    #[must_use]
    pub fn total(&self, catalog: &Catalog) -> Price {
        self.lines
            .iter()
            .filter_map(|line| {
                catalog
                    .get(line.product_id)
                    .map(|product| product.price.times(line.quantity))
            })
            .sum()
    }

    /// Add `quantity` of a (product, size) pair.
    pub fn add(&mut self, product_id: ProductId, quantity: Quantity, size: Option<Size>) -> CartEvent {
        if let Some((index, line)) = self
            .lines
            .iter_mut()
            .enumerate()
            .find(|(_, line)| line.matches(product_id, size))
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return CartEvent::QuantityIncreased {
                line_id: line.id,
                index,
                quantity: line.quantity,
            };
        }

        if self.next_line_id == LineId::MAX {
            self.next_line_id = renumber(&mut self.lines);
        }
        let line_id = self.next_line_id;
        self.next_line_id = line_id.next();
        let index = self.lines.len();
        self.lines.push(CartLine {
            id: line_id,
            product_id,
            quantity,
            size,
        });
        CartEvent::LineAdded { line_id, index }
    }

    /// Overwrite the quantity of the line at `index`.
    ///
    /// A `new_quantity` of zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if `index` is out of range.
    pub fn update_quantity(&mut self, index: usize, new_quantity: i64) -> Result<CartEvent, CartError> {
        if new_quantity <= 0 {
            return self.remove(index);
        }

        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound { index, len })?;

        let quantity = Quantity::try_from(new_quantity.min(i64::from(u32::MAX)))
            .unwrap_or(Quantity::ONE);
        line.quantity = quantity;

        Ok(CartEvent::QuantityChanged {
            line_id: line.id,
            index,
            quantity,
        })
    }

    /// Delete the line at `index`, shifting later lines down.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<CartEvent, CartError> {
        let len = self.lines.len();
        if index >= len {
            return Err(CartError::LineNotFound { index, len });
        }
        let line = self.lines.remove(index);
        Ok(CartEvent::LineRemoved { line, index })
    }

    /// Delete every line.
    pub fn clear(&mut self) -> CartEvent {
        let removed = self.lines.len();
        self.lines.clear();
        CartEvent::Cleared { removed }
    }

    /// Drop lines whose product is not in `catalog`, returning them.
    pub fn retain_known(&mut self, catalog: &Catalog) -> Vec<CartLine> {
        let (known, unknown): (Vec<_>, Vec<_>) = self
            .lines
            .drain(..)
            .partition(|line| catalog.contains(line.product_id));
        self.lines = known;
        unknown
    }
}

/// Give `lines` the identifiers 1..=n in order, returning the next free one.
fn renumber(lines: &mut [CartLine]) -> LineId {
    let mut next = LineId::FIRST;
    for line in lines {
        line.id = next;
        next = next.next();
    }
    next
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::bundled().unwrap()
    }

    #[test]
    fn test_scenario_add_merge_then_zero_update() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let ball = ProductId::new(1);

        cart.add(ball, qty(2), None);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, qty(2));
        assert_eq!(cart.total(&catalog), Price::new(2 * 159_900));

        let event = cart.add(ball, qty(3), None);
        assert!(matches!(event, CartEvent::QuantityIncreased { index: 0, .. }));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, qty(5));
        assert_eq!(cart.total(&catalog), Price::new(5 * 159_900));

        cart.update_quantity(0, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(&catalog), Price::ZERO);
    }

    #[test]
    fn test_size_distinguishes_lines() {
        let mut cart = Cart::new();
        let gloves = ProductId::new(5);

        cart.add(gloves, Quantity::ONE, Some(Size::M));
        cart.add(gloves, Quantity::ONE, Some(Size::L));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].size, Some(Size::M));
        assert_eq!(cart.lines()[1].size, Some(Size::L));
        assert_ne!(cart.lines()[0].id, cart.lines()[1].id);
    }

    #[test]
    fn test_distinct_pairs_sum_quantities() {
        let mut cart = Cart::new();
        let adds = [
            (1, None, 2),
            (2, Some(Size::M), 1),
            (1, None, 4),
            (2, Some(Size::S), 3),
            (2, Some(Size::M), 2),
        ];
        for (id, size, n) in adds {
            cart.add(ProductId::new(id), qty(n), size);
        }

        let summary: Vec<(i32, Option<Size>, u32)> = cart
            .lines()
            .iter()
            .map(|l| (l.product_id.as_i32(), l.size, l.quantity.get()))
            .collect();
        assert_eq!(
            summary,
            vec![(1, None, 6), (2, Some(Size::M), 3), (2, Some(Size::S), 3)]
        );
    }

    #[test]
    fn test_add_existing_leaves_other_lines_untouched() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(1), None);
        cart.add(ProductId::new(3), qty(2), None);
        cart.add(ProductId::new(7), qty(1), Some(Size::XL));
        let before = cart.clone();

        cart.add(ProductId::new(3), qty(4), None);

        assert_eq!(cart.lines()[0], before.lines()[0]);
        assert_eq!(cart.lines()[2], before.lines()[2]);
        assert_eq!(cart.lines()[1].quantity, qty(6));
        assert_eq!(cart.lines()[1].id, before.lines()[1].id);
    }

    #[test]
    fn test_update_non_positive_equals_remove() {
        let mut base = Cart::new();
        base.add(ProductId::new(1), qty(1), None);
        base.add(ProductId::new(2), qty(2), Some(Size::M));
        base.add(ProductId::new(3), qty(3), None);

        for requested in [0, -1, -50] {
            let mut updated = base.clone();
            let mut removed = base.clone();
            let a = updated.update_quantity(1, requested).unwrap();
            let b = removed.remove(1).unwrap();
            assert_eq!(updated, removed);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_update_overwrites_in_place() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(1), None);
        cart.add(ProductId::new(2), qty(1), Some(Size::S));

        let event = cart.update_quantity(1, 7).unwrap();
        assert_eq!(
            event,
            CartEvent::QuantityChanged {
                line_id: cart.lines()[1].id,
                index: 1,
                quantity: qty(7)
            }
        );
        assert_eq!(cart.lines()[1].quantity, qty(7));
        assert_eq!(cart.lines()[0].quantity, qty(1));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(1), None);
        let before = cart.clone();

        assert_eq!(
            cart.update_quantity(3, 2),
            Err(CartError::LineNotFound { index: 3, len: 1 })
        );
        assert_eq!(
            cart.update_quantity(3, 0),
            Err(CartError::LineNotFound { index: 3, len: 1 })
        );
        assert_eq!(
            cart.remove(1),
            Err(CartError::LineNotFound { index: 1, len: 1 })
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_shifts_and_keeps_ids() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(1), None);
        cart.add(ProductId::new(2), qty(1), Some(Size::S));
        cart.add(ProductId::new(3), qty(1), None);
        let third = cart.lines()[2].id;

        cart.remove(0).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.position(third), Some(1));
    }

    #[test]
    fn test_line_ids_not_reused() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(1), None);
        let first = cart.lines()[0].id;
        cart.clear();
        cart.add(ProductId::new(1), qty(1), None);
        assert_ne!(cart.lines()[0].id, first);
    }

    #[test]
    fn test_clear_and_counts() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(2), None);
        cart.add(ProductId::new(2), qty(3), Some(Size::L));
        assert_eq!(cart.item_count(), 5);

        assert_eq!(cart.clear(), CartEvent::Cleared { removed: 2 });
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(&catalog), Price::ZERO);
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let catalog = catalog();
        let mut cart = Cart::new();

        let expected = |cart: &Cart| -> Price {
            cart.lines()
                .iter()
                .map(|l| catalog.get(l.product_id).unwrap().price.times(l.quantity))
                .sum()
        };

        cart.add(ProductId::new(4), qty(2), Some(Size::M));
        assert_eq!(cart.total(&catalog), expected(&cart));
        cart.add(ProductId::new(12), qty(1), None);
        assert_eq!(cart.total(&catalog), expected(&cart));
        cart.update_quantity(0, 9).unwrap();
        assert_eq!(cart.total(&catalog), expected(&cart));
        cart.remove(1).unwrap();
        assert_eq!(cart.total(&catalog), expected(&cart));
        assert_eq!(cart.total(&catalog), Price::new(9 * 245_900));
    }

    #[test]
    fn test_from_parts_restores_invariants() {
        let line = |id: i32, product: i32, n: u32, size: Option<Size>| CartLine {
            id: LineId::new(id),
            product_id: ProductId::new(product),
            quantity: qty(n),
            size,
        };

        let cart = Cart::from_parts(
            vec![
                line(1, 1, 2, None),
                line(1, 2, 1, Some(Size::M)),
                line(4, 1, 3, None),
            ],
            LineId::new(2),
        );

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].quantity, qty(5));
        assert_ne!(cart.lines()[0].id, cart.lines()[1].id);
        assert!(cart.next_line_id() > cart.lines()[1].id);
        assert!(cart.next_line_id() > cart.lines()[0].id);
    }

    #[test]
    fn test_add_renumbers_when_ids_run_out() {
        let mut cart = Cart::from_parts(
            vec![CartLine {
                id: LineId::new(9),
                product_id: ProductId::new(1),
                quantity: qty(1),
                size: None,
            }],
            LineId::new(i32::MAX - 1),
        );
        assert_eq!(cart.next_line_id(), LineId::new(i32::MAX - 1));

        cart.add(ProductId::new(3), qty(1), None);
        cart.add(ProductId::new(6), qty(1), None);

        let ids: Vec<LineId> = cart.lines().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![LineId::new(1), LineId::new(2), LineId::new(3)]);
        assert_eq!(cart.next_line_id(), LineId::new(4));
    }

    #[test]
    fn test_retain_known() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), qty(1), None);
        cart.add(ProductId::new(404), qty(1), None);

        let dropped = cart.retain_known(&catalog);

        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].product_id, ProductId::new(404));
        assert_eq!(cart.len(), 1);
    }
}
