use axum::routing::post;
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::receive_webhook;

/// Billing webhook routes. Authenticated by signature, not by session.
///
/// - `POST /billing/webhook` - Receive a processor event
pub fn billing_routes() -> Router<AppState> {
    Router::new().route("/billing/webhook", post(receive_webhook))
}
