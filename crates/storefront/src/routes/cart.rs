//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart lives in the visitor session under the configured slot key;
//! every handler loads it into a `CartStore`, applies one operation and
//! flushes the slot before responding. Without HTMX each action answers with
//! a 303 back to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use strivo_core::{
    CartError, CartStore, LineId, Mutation, ProductId, Quantity, Size, StorageError,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::is_htmx;
use crate::session_slot::SessionSlot;
use crate::state::AppState;
use crate::views::CartView;

/// Banner shown when the cart could not be written back to the session.
pub const PERSIST_WARNING: &str =
    "No pudimos guardar los cambios de tu carrito. Se conservarán solo mientras sigas en esta página.";

/// Query flag carrying a persistence warning across a redirect.
const WARNING_STORAGE: &str = "storage";

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart from their session.
pub async fn load_cart(state: &AppState, session: Session) -> Result<CartStore<SessionSlot>> {
    let key = state.config().cart_slot.as_str();
    let slot = SessionSlot::load(session, key).await?;
    Ok(CartStore::load(slot, key, state.catalog_handle()))
}

/// Item count for the navigation badge.
pub async fn cart_count(state: &AppState, session: Session) -> Result<u64> {
    Ok(load_cart(state, session).await?.item_count())
}

/// A cart after its mutation was flushed.
struct Committed {
    cart: CartView,
    warning: Option<&'static str>,
}

/// Flush the slot and project the cart for display.
///
/// A failed write, in the store or in the session, becomes a warning; the
/// in-memory cart is still what the visitor sees.
async fn commit(store: CartStore<SessionSlot>, store_warning: Option<StorageError>) -> Committed {
    let cart = CartView::from(&store.summary());
    let mut failed = store_warning.is_some();

    if let Err(e) = store.into_storage().flush().await {
        tracing::warn!(error = %e, "Failed to write cart to session");
        failed = true;
    }

    Committed {
        cart,
        warning: failed.then_some(PERSIST_WARNING),
    }
}

/// Respond to a cart mutation: the items fragment for HTMX, else a redirect.
fn cart_updated(headers: &HeaderMap, committed: Committed) -> Response {
    if is_htmx(headers) {
        return (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: committed.cart,
                warning: committed.warning,
            },
        )
            .into_response();
    }

    let target = if committed.warning.is_some() {
        format!("/cart?warning={WARNING_STORAGE}")
    } else {
        "/cart".to_string()
    };
    Redirect::to(&target).into_response()
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data, as posted by the product modal.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Raw quantity input; clamped to 1-10.
    pub quantity: Option<String>,
    pub size: Option<String>,
}

/// Form addressing one cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub line_id: String,
}

/// Clear cart form data.
#[derive(Debug, Deserialize)]
pub struct ClearCartForm {
    pub confirm: Option<String>,
}

/// Cart page query parameters (set by non-HTMX redirects).
#[derive(Debug, Deserialize)]
pub struct CartPageQuery {
    pub added: Option<String>,
    pub warning: Option<String>,
}

fn parse_line_id(raw: &str) -> Result<LineId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid line id: {raw}")))
}

fn parse_size(raw: Option<&str>) -> Result<Option<Size>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<Size>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u64,
    pub warning: Option<&'static str>,
    pub toast: Option<String>,
    pub nonce: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub warning: Option<&'static str>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Toast confirming an add (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub message: String,
    pub warning: Option<&'static str>,
}

/// Clear confirmation fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/confirm_clear.html")]
pub struct ConfirmClearTemplate;

/// Clear confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "cart/confirm_clear.html")]
pub struct ConfirmClearPageTemplate {
    pub cart_count: u64,
    pub nonce: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Query(query): Query<CartPageQuery>,
) -> Result<impl IntoResponse> {
    let store = load_cart(&state, session).await?;
    let cart = CartView::from(&store.summary());

    let toast = query
        .added
        .as_deref()
        .and_then(|raw| raw.parse::<ProductId>().ok())
        .and_then(|id| state.catalog().get(id))
        .map(|product| added_message(&product.name));
    let warning = (query.warning.as_deref() == Some(WARNING_STORAGE)).then_some(PERSIST_WARNING);

    Ok(CartShowTemplate {
        cart_count: cart.item_count,
        cart,
        warning,
        toast,
        nonce,
    })
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let count = cart_count(&state, session).await?;
    Ok(CartCountTemplate { count })
}

fn added_message(name: &str) -> String {
    format!("{name} añadido al carrito")
}

/// Add item to cart.
///
/// Returns a toast and an HTMX trigger that refreshes the count badge.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id: ProductId = form
        .product_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {}", form.product_id)))?;
    let product = state
        .catalog()
        .get(product_id)
        .ok_or(CartError::UnknownProduct(product_id))?;

    let quantity = Quantity::from_modal_input(form.quantity.as_deref().unwrap_or_default());
    let size = if product.is_sized() {
        parse_size(form.size.as_deref())?
    } else {
        None
    };
    let message = added_message(&product.name);

    let mut store = load_cart(&state, session).await?;
    let Mutation { warning, .. } = store.add(product_id, quantity, size)?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &product_id.to_string())]),
    );
    tracing::info!(%product_id, quantity = quantity.get(), ?size, "Added to cart");

    let committed = commit(store, warning).await;

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartAddedTemplate {
                message,
                warning: committed.warning,
            },
        )
            .into_response());
    }

    let mut target = format!("/cart?added={product_id}");
    if committed.warning.is_some() {
        target.push_str("&warning=");
        target.push_str(WARNING_STORAGE);
    }
    Ok(Redirect::to(&target).into_response())
}

/// Apply a quantity delta to one line; reaching zero removes it.
async fn step_quantity(
    state: &AppState,
    session: Session,
    headers: &HeaderMap,
    line_id: &str,
    delta: i64,
) -> Result<Response> {
    let line_id = parse_line_id(line_id)?;
    let mut store = load_cart(state, session).await?;

    let index = store.position(line_id)?;
    let current = store
        .cart()
        .line(index)
        .map_or(0, |line| i64::from(line.quantity.get()));
    let Mutation { event, warning } = store.update_quantity(index, current.saturating_add(delta))?;
    tracing::debug!(?event, "Updated cart quantity");

    Ok(cart_updated(headers, commit(store, warning).await))
}

/// Increase a line's quantity by one.
#[instrument(skip(state, session, headers))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    step_quantity(&state, session, &headers, &form.line_id, 1).await
}

/// Decrease a line's quantity by one, removing it at zero.
#[instrument(skip(state, session, headers))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    step_quantity(&state, session, &headers, &form.line_id, -1).await
}

/// Remove a line from the cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let line_id = parse_line_id(&form.line_id)?;
    let mut store = load_cart(&state, session).await?;

    let index = store.position(line_id)?;
    let Mutation { warning, .. } = store.remove(index)?;
    tracing::info!(%line_id, "Removed cart line");

    Ok(cart_updated(&headers, commit(store, warning).await))
}

/// Empty the cart once the visitor confirms.
#[instrument(skip(state, session, headers, nonce))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    CspNonce(nonce): CspNonce,
    Form(form): Form<ClearCartForm>,
) -> Result<Response> {
    if form.confirm.as_deref() != Some("true") {
        if is_htmx(&headers) {
            return Ok(ConfirmClearTemplate.into_response());
        }
        let cart_count = cart_count(&state, session).await?;
        return Ok(ConfirmClearPageTemplate { cart_count, nonce }.into_response());
    }

    let mut store = load_cart(&state, session).await?;
    let Mutation { warning, .. } = store.clear();
    tracing::info!("Cleared cart");

    Ok(cart_updated(&headers, commit(store, warning).await))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{HeaderValue, StatusCode, header::LOCATION};
    use strivo_core::{Cart, CartSummary, Catalog};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::routes::HX_REQUEST;

    fn committed(warning: Option<&'static str>) -> Committed {
        let catalog = Catalog::bundled().unwrap();
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), Quantity::ONE, None);
        Committed {
            cart: CartView::from(&CartSummary::project(&cart, &catalog)),
            warning,
        }
    }

    fn htmx_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        headers
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_cart_updated_htmx_shows_storage_banner() {
        let response = cart_updated(&htmx_headers(), committed(Some(PERSIST_WARNING)));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            "cart-updated"
        );

        let body = body_text(response).await;
        assert!(body.contains(PERSIST_WARNING));
        assert!(body.contains("id=\"cart-items\""));
    }

    #[tokio::test]
    async fn test_cart_updated_htmx_without_warning_has_no_banner() {
        let response = cart_updated(&htmx_headers(), committed(None));
        let body = body_text(response).await;
        assert!(!body.contains(PERSIST_WARNING));
    }

    #[test]
    fn test_cart_updated_redirect_carries_warning_flag() {
        let response = cart_updated(&HeaderMap::new(), committed(Some(PERSIST_WARNING)));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/cart?warning=storage"
        );

        let response = cart_updated(&HeaderMap::new(), committed(None));
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/cart");
    }

    #[tokio::test]
    async fn test_commit_turns_store_failure_into_warning() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let slot = SessionSlot::load(session, "strivo_cart").await.unwrap();
        let store = CartStore::load(slot, "strivo_cart", Arc::new(Catalog::bundled().unwrap()));

        let failed = commit(store, Some(StorageError::Backend("quota exceeded".to_string()))).await;
        assert_eq!(failed.warning, Some(PERSIST_WARNING));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size(None).unwrap(), None);
        assert_eq!(parse_size(Some("  ")).unwrap(), None);
        assert_eq!(parse_size(Some("xl")).unwrap(), Some(Size::XL));
        assert!(matches!(
            parse_size(Some("XXL")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_line_id() {
        assert_eq!(parse_line_id("7").unwrap(), LineId::new(7));
        assert!(matches!(parse_line_id("seven"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_added_message() {
        assert_eq!(
            added_message("Kit de Pesas Ajustables"),
            "Kit de Pesas Ajustables añadido al carrito"
        );
    }
}
