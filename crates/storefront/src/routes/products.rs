//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use strivo_core::{CategoryFilter, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::{cart::cart_count, is_htmx};
use crate::state::AppState;
use crate::views::{FilterButton, ProductView, SizeOption, filter_buttons, size_options};

/// Category filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub categories: Vec<FilterButton>,
    pub products: Vec<ProductView>,
    pub cart_count: u64,
    pub nonce: String,
}

/// Product grid fragment template (for HTMX filter buttons).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub sizes: Vec<SizeOption>,
    pub cart_count: u64,
    pub nonce: String,
}

/// Quick view fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_view.html")]
pub struct QuickViewTemplate {
    pub product: ProductView,
    pub sizes: Vec<SizeOption>,
}

fn find_product(state: &AppState, raw_id: &str) -> Result<ProductView> {
    let not_found = || AppError::NotFound(format!("product {raw_id}"));
    let id: ProductId = raw_id.parse().map_err(|_| not_found())?;
    state
        .catalog()
        .get(id)
        .map(ProductView::from)
        .ok_or_else(not_found)
}

/// Display product listing, filtered by category.
///
/// `all` or no category lists everything; an unknown slug lists nothing.
#[instrument(skip(state, session, headers, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    CspNonce(nonce): CspNonce,
    Query(query): Query<CategoryQuery>,
) -> Result<Response> {
    let filter = CategoryFilter::parse(query.category.as_deref().unwrap_or_default());
    let products: Vec<ProductView> = state
        .catalog()
        .filter(&filter)
        .into_iter()
        .map(ProductView::from)
        .collect();
    tracing::debug!(category = filter.slug(), count = products.len(), "Filtered products");

    if is_htmx(&headers) {
        return Ok(ProductGridTemplate { products }.into_response());
    }

    Ok(ProductsIndexTemplate {
        categories: filter_buttons(&filter),
        products,
        cart_count: cart_count(&state, session).await?,
        nonce,
    }
    .into_response())
}

/// Display product detail page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, &id)?;

    Ok(ProductShowTemplate {
        product,
        sizes: size_options(),
        cart_count: cart_count(&state, session).await?,
        nonce,
    })
}

/// Quick view fragment for the product modal (HTMX).
#[instrument(skip(state))]
pub async fn quick_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(QuickViewTemplate {
        product: find_product(&state, &id)?,
        sizes: size_options(),
    })
}
