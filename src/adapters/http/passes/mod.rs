//! Pass issuance endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{IssuePassRequest, PassResponse};
pub use routes::pass_routes;
