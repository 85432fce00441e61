//! Persisted cart format.
//!
//! The slot holds a versioned JSON document:
//!
//! ```json
//! {"version":1,"next_line_id":3,"lines":[{"id":1,"product_id":4,"quantity":2,"size":"M"}]}
//! ```
//!
//! Slots written by the first storefront release hold a bare array of
//! `{"product": {...}, "quantity": n, "size": ...}` entries with a full
//! product snapshot in each. Those are migrated on read: only the product id
//! is kept and prices are looked up in the catalog again.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Cart, CartLine};
use crate::types::{LineId, ProductId, Quantity, Size};

/// Current version of the persisted document.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors decoding a stored cart.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed cart JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported cart schema version {0}")]
    UnsupportedVersion(u64),
    #[error("cart document is neither an object nor an array")]
    UnexpectedShape,
}

/// Which layout a decoded slot used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Current,
    Legacy,
}

/// A decoded cart plus how it was stored.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub cart: Cart,
    pub format: Format,
    /// Stored lines discarded for holding a quantity below one.
    pub dropped: usize,
}

#[derive(Serialize)]
struct StoredCartRef<'a> {
    version: u32,
    next_line_id: LineId,
    lines: &'a [CartLine],
}

#[derive(Deserialize)]
struct StoredCart {
    next_line_id: LineId,
    lines: Vec<StoredLine>,
}

// Quantities are read as plain integers so one bad line does not sink the
// whole document.
#[derive(Deserialize)]
struct StoredLine {
    id: LineId,
    product_id: ProductId,
    quantity: i64,
    #[serde(default)]
    size: Option<Size>,
}

#[derive(Deserialize)]
struct LegacyLine {
    product: LegacyProduct,
    quantity: i64,
    #[serde(default)]
    size: Option<Size>,
}

#[derive(Deserialize)]
struct LegacyProduct {
    id: ProductId,
}

/// Serialize a cart in the current format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StoredCartRef {
        version: SCHEMA_VERSION,
        next_line_id: cart.next_line_id(),
        lines: cart.lines(),
    })
}

/// Parse a stored cart, migrating the legacy layout.
///
/// The result is normalized with [`Cart::from_parts`]; it is not checked
/// against a catalog.
///
/// # Errors
///
/// Returns an error if the text is not JSON, has an unknown version, or
/// does not match either layout.
pub fn decode(raw: &str) -> Result<Decoded, CodecError> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Array(_) => decode_legacy(value),
        Value::Object(ref map) => {
            let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
            if version != u64::from(SCHEMA_VERSION) {
                return Err(CodecError::UnsupportedVersion(version));
            }
            decode_current(value)
        }
        _ => Err(CodecError::UnexpectedShape),
    }
}

fn decode_current(value: Value) -> Result<Decoded, CodecError> {
    let stored: StoredCart = serde_json::from_value(value)?;
    let total = stored.lines.len();
    let lines: Vec<CartLine> = stored
        .lines
        .into_iter()
        .filter_map(|line| {
            Quantity::try_from(line.quantity)
                .ok()
                .map(|quantity| CartLine {
                    id: line.id,
                    product_id: line.product_id,
                    quantity,
                    size: line.size,
                })
        })
        .collect();
    let dropped = total - lines.len();

    Ok(Decoded {
        cart: Cart::from_parts(lines, stored.next_line_id),
        format: Format::Current,
        dropped,
    })
}

fn decode_legacy(value: Value) -> Result<Decoded, CodecError> {
    let stored: Vec<LegacyLine> = serde_json::from_value(value)?;
    let total = stored.len();

    let mut next = LineId::FIRST;
    let mut lines = Vec::with_capacity(total);
    for line in stored {
        let Ok(quantity) = Quantity::try_from(line.quantity) else {
            continue;
        };
        lines.push(CartLine {
            id: next,
            product_id: line.product.id,
            quantity,
            size: line.size,
        });
        next = next.next();
    }
    let dropped = total - lines.len();

    Ok(Decoded {
        cart: Cart::from_parts(lines, next),
        format: Format::Legacy,
        dropped,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shape() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(4), Quantity::new(2).unwrap(), Some(Size::M));
        cart.add(ProductId::new(12), Quantity::ONE, None);

        let json: Value = serde_json::from_str(&encode(&cart).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "next_line_id": 3,
                "lines": [
                    {"id": 1, "product_id": 4, "quantity": 2, "size": "M"},
                    {"id": 2, "product_id": 12, "quantity": 1, "size": null}
                ]
            })
        );
    }

    #[test]
    fn test_decode_restores_encoded_cart() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(2), Quantity::new(3).unwrap(), Some(Size::XL));
        cart.add(ProductId::new(6), Quantity::ONE, None);
        cart.remove(0).unwrap();
        cart.add(ProductId::new(1), Quantity::ONE, Some(Size::S));

        let decoded = decode(&encode(&cart).unwrap()).unwrap();
        assert_eq!(decoded.format, Format::Current);
        assert_eq!(decoded.dropped, 0);
        assert_eq!(decoded.cart, cart);
    }

    #[test]
    fn test_decode_legacy_array() {
        let raw = r#"[
            {"product": {"id": 1, "name": "Balón", "price": 1, "category": "futbol"}, "quantity": 2, "size": "S"},
            {"product": {"id": 12, "name": "Canasta"}, "quantity": 1, "size": null},
            {"product": {"id": 3}, "quantity": 0, "size": null},
            {"product": {"id": 1}, "quantity": 3, "size": "S"}
        ]"#;

        let decoded = decode(raw).unwrap();
        assert_eq!(decoded.format, Format::Legacy);
        assert_eq!(decoded.dropped, 1);

        let lines = decoded.cart.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, ProductId::new(1));
        assert_eq!(lines[0].quantity.get(), 5);
        assert_eq!(lines[0].size, Some(Size::S));
        assert_eq!(lines[1].product_id, ProductId::new(12));
        assert_eq!(lines[1].size, None);
    }

    #[test]
    fn test_decode_drops_non_positive_lines() {
        let raw = r#"{"version":1,"next_line_id":4,"lines":[
            {"id":1,"product_id":1,"quantity":-2,"size":null},
            {"id":2,"product_id":2,"quantity":1,"size":"M"}
        ]}"#;
        let decoded = decode(raw).unwrap();
        assert_eq!(decoded.dropped, 1);
        assert_eq!(decoded.cart.len(), 1);
        assert_eq!(decoded.cart.next_line_id(), LineId::new(4));
    }

    #[test]
    fn test_decode_exhausted_counter_keeps_ids_unique() {
        let mut cart = decode(r#"{"version":1,"next_line_id":2147483647,"lines":[]}"#)
            .unwrap()
            .cart;
        cart.add(ProductId::new(1), Quantity::ONE, None);
        cart.add(ProductId::new(3), Quantity::ONE, None);
        let second = cart.lines()[1].id;
        assert_ne!(cart.lines()[0].id, second);
        assert_eq!(cart.position(second), Some(1));

        let raw = r#"{"version":1,"next_line_id":5,"lines":[
            {"id":2147483647,"product_id":1,"quantity":1,"size":null},
            {"id":3,"product_id":2,"quantity":2,"size":"M"}
        ]}"#;
        let mut cart = decode(raw).unwrap().cart;
        assert_eq!(cart.lines()[0].id, LineId::new(1));
        assert_eq!(cart.lines()[1].id, LineId::new(2));
        cart.add(ProductId::new(6), Quantity::ONE, None);
        cart.add(ProductId::new(12), Quantity::ONE, None);
        let mut ids: Vec<LineId> = cart.lines().iter().map(|l| l.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(cart.position(cart.lines()[3].id), Some(3));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode("not json"), Err(CodecError::Json(_))));
        assert!(matches!(decode("\"text\""), Err(CodecError::UnexpectedShape)));
        assert!(matches!(
            decode(r#"{"version":2,"next_line_id":1,"lines":[]}"#),
            Err(CodecError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            decode(r#"{"lines":[]}"#),
            Err(CodecError::UnsupportedVersion(0))
        ));
        assert!(matches!(
            decode(r#"[{"quantity": 1}]"#),
            Err(CodecError::Json(_))
        ));
    }
}
