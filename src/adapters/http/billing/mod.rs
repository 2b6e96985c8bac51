//! Billing processor webhook endpoint.

mod handlers;
mod routes;

pub use routes::billing_routes;
