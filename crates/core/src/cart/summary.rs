//! Read-only cart projection for display.

use serde::Serialize;

use super::Cart;
use crate::catalog::Catalog;
use crate::types::{Category, LineId, Price, ProductId, Quantity, Size};

/// One cart line joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub line_id: LineId,
    /// Position in the cart at projection time.
    pub index: usize,
    pub product_id: ProductId,
    pub name: String,
    pub category: Category,
    pub image: String,
    pub size: Option<Size>,
    pub quantity: Quantity,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Everything the cart panel and badge render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CartSummary {
    pub lines: Vec<LineSummary>,
    pub total: Price,
    pub item_count: u64,
}

impl CartSummary {
    /// Join the cart's lines with the catalog.
    ///
    /// Lines whose product is missing from the catalog are skipped and do
    /// not count toward the total.
    #[must_use]
    pub fn project(cart: &Cart, catalog: &Catalog) -> Self {
        let lines: Vec<LineSummary> = cart
            .lines()
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let product = catalog.get(line.product_id)?;
                Some(LineSummary {
                    line_id: line.id,
                    index,
                    product_id: product.id,
                    name: product.name.clone(),
                    category: product.category,
                    image: product.image.clone(),
                    size: line.size,
                    quantity: line.quantity,
                    unit_price: product.price,
                    line_total: product.price.times(line.quantity),
                })
            })
            .collect();

        let total = lines.iter().map(|line| line.line_total).sum();
        let item_count = lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum();

        Self {
            lines,
            total,
            item_count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
