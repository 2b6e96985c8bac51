//! HTTP adapter - axum routes, middleware and DTOs.

pub mod billing;
pub mod error;
pub mod middleware;
pub mod passes;
mod router;

pub use error::{ErrorResponse, PassApiError, WebhookApiError};
pub use router::{build_router, AppState, RouterOptions};
