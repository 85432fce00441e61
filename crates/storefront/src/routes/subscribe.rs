//! Newsletter subscription route handlers.
//!
//! Fields are checked one at a time as the visitor leaves them, and all
//! together on submit. An accepted subscription is acknowledged locally and
//! logged; nothing is sent anywhere.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use strivo_core::subscription::{self, Field, SubscriptionInput};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::{cart::cart_count, is_htmx};
use crate::state::AppState;
use crate::views::SubscribeFormView;

/// Form fragment, re-rendered with errors (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/subscribe_form.html")]
pub struct SubscribeFormTemplate {
    pub form: SubscribeFormView,
}

/// Success fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/subscribe_success.html")]
pub struct SubscribeSuccessTemplate {
    pub first_name: String,
}

/// Full page for subscriptions posted without HTMX.
#[derive(Template, WebTemplate)]
#[template(path = "subscribe/page.html")]
pub struct SubscribePageTemplate {
    pub form: SubscribeFormView,
    /// Set once the subscription is accepted.
    pub first_name: Option<String>,
    pub cart_count: u64,
    pub nonce: String,
}

/// Feedback for a single field (blur/change check).
#[derive(Template, WebTemplate)]
#[template(path = "partials/field_feedback.html")]
pub struct FieldFeedbackTemplate {
    pub field: &'static str,
    pub error: Option<String>,
}

/// Submit the subscription form.
#[instrument(skip(state, session, headers, nonce, pairs))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    CspNonce(nonce): CspNonce,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let input = SubscriptionInput::from_pairs(pairs);

    let (form, first_name) = match subscription::validate(&input) {
        Ok(accepted) => {
            tracing::info!(
                email_domain = accepted.email.domain(),
                interests = ?accepted.interests,
                subscribed_at = %accepted.subscribed_at,
                "Subscription accepted"
            );
            add_breadcrumb("subscription", "Subscribed", None);
            (SubscribeFormView::default(), Some(accepted.first_name))
        }
        Err(errors) => {
            tracing::debug!(failed = errors.len(), "Subscription rejected");
            (SubscribeFormView::new(&input, &errors), None)
        }
    };

    if is_htmx(&headers) {
        return Ok(match first_name {
            Some(first_name) => SubscribeSuccessTemplate { first_name }.into_response(),
            None => SubscribeFormTemplate { form }.into_response(),
        });
    }

    Ok(SubscribePageTemplate {
        form,
        first_name,
        cart_count: cart_count(&state, session).await?,
        nonce,
    }
    .into_response())
}

/// Check one field and return its feedback fragment.
#[instrument(skip(pairs))]
pub async fn validate_field(
    Path(field): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let field: Field = field
        .parse()
        .map_err(|_| AppError::NotFound(format!("subscription field {field}")))?;
    let input = SubscriptionInput::from_pairs(pairs);
    let error = subscription::validate_field(&input, field)
        .err()
        .map(|e| e.to_string());

    Ok(FieldFeedbackTemplate {
        field: field.name(),
        error,
    })
}
