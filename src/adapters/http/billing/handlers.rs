//! HTTP handler for billing processor webhooks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::adapters::http::error::WebhookApiError;
use crate::adapters::http::AppState;

const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /billing/webhook - Verify a delivery and acknowledge it.
///
/// Returns 200 as soon as the signature checks out; the event is processed
/// on a detached task and its outcome never changes this response.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let accepted = state.webhooks.handle(&body, signature)?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "received": true, "eventId": accepted.event_id })),
    ))
}
