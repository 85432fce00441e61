//! Checkout placeholder.
//!
//! There is no payment step: checking out empties the cart and thanks the
//! visitor. No order is recorded.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use strivo_core::Mutation;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::cart::{PERSIST_WARNING, load_cart};
use crate::state::AppState;

/// Thank-you page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CheckoutCompleteTemplate {
    pub total: String,
    pub item_count: u64,
    pub warning: Option<&'static str>,
    pub cart_count: u64,
    pub nonce: String,
}

/// Empty the cart and show the thank-you page.
#[instrument(skip(state, session, nonce))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let mut store = load_cart(&state, session).await?;
    let total = store.total();
    let item_count = store.item_count();

    let Mutation { warning, .. } = store.clear();
    let mut failed = warning.is_some();
    if let Err(e) = store.into_storage().flush().await {
        tracing::warn!(error = %e, "Failed to write cart to session");
        failed = true;
    }

    add_breadcrumb("checkout", "Checked out", None);
    tracing::info!(item_count, total = total.amount(), "Checkout completed");

    Ok(CheckoutCompleteTemplate {
        total: total.display(),
        item_count,
        warning: failed.then_some(PERSIST_WARNING),
        cart_count: 0,
        nonce,
    })
}
