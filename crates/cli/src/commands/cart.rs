//! Cart commands against a slot file.
//!
//! Lines are addressed by their position, as printed by `cart show`.
//!
//! # Usage
//!
//! ```bash
//! strivo cart add 1 --quantity 2 --size M
//! strivo cart show
//! strivo cart update 0 5
//! strivo cart remove 0
//! strivo cart clear
//! ```

use std::io::Write;

use strivo_core::{
    CartEvent, CartStore, Mutation, ProductId, Quantity, Size, SlotStorage,
};

use super::CliError;

/// Print the cart, one line per entry, followed by the totals.
pub fn show<S: SlotStorage>(store: &CartStore<S>, out: &mut impl Write) -> Result<(), CliError> {
    let summary = store.summary();
    if summary.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for line in &summary.lines {
        let size = line
            .size
            .map_or_else(String::new, |size| format!(" (size {size})"));
        writeln!(
            out,
            "[{}] {}{} x{} @ {} = {}",
            line.index, line.name, size, line.quantity, line.unit_price, line.line_total
        )?;
    }
    writeln!(out, "Items: {}", summary.item_count)?;
    writeln!(out, "Total: {}", summary.total)?;
    Ok(())
}

/// Add a product. Sized products default to size S.
pub fn add<S: SlotStorage>(
    store: &mut CartStore<S>,
    product_id: ProductId,
    quantity: i64,
    size: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let quantity =
        Quantity::try_from(quantity).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let size = size
        .map(str::parse::<Size>)
        .transpose()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let mutation = store.add(product_id, quantity, size)?;
    report(store, mutation, out)
}

/// Set a line's quantity; zero or less removes it.
pub fn update<S: SlotStorage>(
    store: &mut CartStore<S>,
    index: usize,
    quantity: i64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mutation = store.update_quantity(index, quantity)?;
    report(store, mutation, out)
}

pub fn remove<S: SlotStorage>(
    store: &mut CartStore<S>,
    index: usize,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mutation = store.remove(index)?;
    report(store, mutation, out)
}

pub fn clear<S: SlotStorage>(store: &mut CartStore<S>, out: &mut impl Write) -> Result<(), CliError> {
    let mutation = store.clear();
    report(store, mutation, out)
}

/// Describe what a mutation did and surface a failed save.
fn report<S: SlotStorage>(
    store: &CartStore<S>,
    mutation: Mutation,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let name_at = |index: usize| {
        store
            .cart()
            .line(index)
            .and_then(|line| store.catalog().get(line.product_id))
            .map_or_else(|| "line".to_string(), |product| product.name.clone())
    };

    match mutation.event {
        CartEvent::LineAdded { index, .. } => {
            writeln!(out, "Added {} as line {index}", name_at(index))?;
        }
        CartEvent::QuantityIncreased {
            index, quantity, ..
        } => {
            writeln!(out, "{} now x{quantity}", name_at(index))?;
        }
        CartEvent::QuantityChanged {
            index, quantity, ..
        } => {
            writeln!(out, "Line {index} set to x{quantity}")?;
        }
        CartEvent::LineRemoved { index, .. } => {
            writeln!(out, "Removed line {index}")?;
        }
        CartEvent::Cleared { removed } => {
            writeln!(out, "Cleared {removed} line(s)")?;
        }
    }

    if let Some(warning) = mutation.warning {
        tracing::warn!(error = %warning, "Cart change was not saved");
        writeln!(out, "Warning: change not saved ({warning})")?;
    }

    writeln!(out, "Total: {}", store.total())?;
    Ok(())
}
