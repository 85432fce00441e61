//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (filters, grid, subscription form)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check
//!
//! # Products
//! GET  /products?category=slug    - Product listing (grid fragment for HTMX)
//! GET  /products/{id}             - Product detail
//! GET  /products/{id}/quick-view  - Quick view modal fragment (HTMX)
//!
//! # Cart (HTMX fragments, 303 to /cart without HTMX)
//! GET  /cart                      - Cart page
//! GET  /cart/count                - Cart count badge (fragment)
//! POST /cart/add                  - Add to cart (badge + toast fragment)
//! POST /cart/increment            - Quantity + 1 (cart_items fragment)
//! POST /cart/decrement            - Quantity - 1 (cart_items fragment)
//! POST /cart/remove               - Remove line (cart_items fragment)
//! POST /cart/clear                - Confirm, then empty the cart
//!
//! # Checkout
//! POST /checkout                  - Placeholder: empties the cart, thanks the visitor
//!
//! # Subscription
//! POST /subscribe                 - Validate and accept the subscription form
//! POST /subscribe/validate/{field} - Check a single field (fragment)
//! ```

pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;
pub mod subscribe;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;

/// Header htmx sets on every request it issues.
pub const HX_REQUEST: &str = "hx-request";

/// Whether the request came from htmx and expects a fragment.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/quick-view", get(products::quick_view))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the subscription routes router.
pub fn subscribe_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(subscribe::submit))
        .route("/validate/{field}", post(subscribe::validate_field))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .nest("/subscribe", subscribe_routes())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("false"));
        assert!(!is_htmx(&headers));
    }
}
