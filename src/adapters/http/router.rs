//! Top-level router and middleware stack.
//!
//! # Layer order (outermost first)
//!
//! 1. `SetRequestIdLayer` - assigns `x-request-id` when absent
//! 2. `TraceLayer` - request span and latency
//! 3. `PropagateRequestIdLayer` - echoes the id on the response
//! 4. `TimeoutLayer` - bounds total handling time
//! 5. `CorsLayer`

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::handlers::{BillingWebhookHandler, IssuePassHandler};
use crate::ports::SessionValidator;

use super::billing::billing_routes;
use super::middleware::auth_middleware;
use super::passes::pass_routes;

/// Shared state for every route. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub issue_pass: Arc<IssuePassHandler>,
    pub webhooks: Arc<BillingWebhookHandler>,
    pub sessions: Arc<dyn SessionValidator>,
}

#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub request_timeout: Duration,
    /// Allowed browser origins. Empty means same-origin only.
    pub cors_origins: Vec<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the service router.
///
/// # Routes
///
/// - `GET /health` - Liveness check
/// - `POST /passes` - Issue a pass (bearer auth)
/// - `POST /billing/webhook` - Billing processor events (signature auth)
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let authenticated = pass_routes().route_layer(axum::middleware::from_fn_with_state(
        state.sessions.clone(),
        auth_middleware,
    ));

    Router::new()
        .route("/health", get(health))
        .merge(authenticated)
        .merge(billing_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(options.request_timeout))
                .layer(cors_layer(&options.cors_origins)),
        )
}
