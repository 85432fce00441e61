//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use strivo_core::CategoryFilter;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::cart::cart_count;
use crate::state::AppState;
use crate::views::{FilterButton, ProductView, SubscribeFormView, filter_buttons};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Category filter bar.
    pub categories: Vec<FilterButton>,
    /// Every catalog product.
    pub products: Vec<ProductView>,
    /// Empty subscription form.
    pub form: SubscribeFormView,
    pub cart_count: u64,
    pub nonce: String,
}

/// Display the home page.
#[instrument(skip(state, session, nonce))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let filter = CategoryFilter::All;
    let products = state
        .catalog()
        .filter(&filter)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(HomeTemplate {
        categories: filter_buttons(&filter),
        products,
        form: SubscribeFormView::default(),
        cart_count: cart_count(&state, session).await?,
        nonce,
    })
}
