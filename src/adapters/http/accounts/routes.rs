//! Axum router configuration for the account endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{account_status, create_account, handle_stripe_webhook, AccountAppState};

/// User-facing account routes.
///
/// # Routes
/// - `POST /` - Start onboarding, returns the provider-hosted URL
/// - `GET /status` - Eligibility view, `?refresh=true` folds in live
///   provider state first
pub fn account_routes() -> Router<AccountAppState> {
    Router::new()
        .route("/", post(create_account))
        .route("/status", get(account_status))
}

/// Webhook routes.
///
/// Separate from the user routes: deliveries carry no user session and are
/// authenticated by signature instead.
///
/// # Routes
/// - `POST /stripe` - Inbound provider events
pub fn webhook_routes() -> Router<AccountAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Complete API router, suitable for mounting at `/api`.
pub fn api_router() -> Router<AccountAppState> {
    Router::new()
        .nest("/accounts", account_routes())
        .nest("/webhooks", webhook_routes())
}
