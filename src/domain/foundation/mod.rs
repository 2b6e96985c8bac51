//! Primitives shared by every domain module.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ExternalIdentity, GymId, PassId, SubscriptionId, UserId};
pub use timestamp::Timestamp;
