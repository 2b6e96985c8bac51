use axum::routing::post;
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::issue_pass;

/// Pass routes. Callers must be authenticated.
///
/// - `POST /passes` - Issue a pass
pub fn pass_routes() -> Router<AppState> {
    Router::new().route("/passes", post(issue_pass))
}
