//! Identity handlers.
//!
//! Maps an authenticated external identity to the internal user record.

mod resolve_identity;

pub use resolve_identity::{ResolveIdentityCommand, ResolveIdentityHandler};
