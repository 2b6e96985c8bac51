//! Authenticated caller.
//!
//! Populated by whichever `SessionValidator` adapter is wired in; the domain
//! only sees the provider's subject and the optional profile claims.

use super::ExternalIdentity;
use thiserror::Error;

/// Caller identity taken from a validated session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Provider subject (`sub`).
    pub id: ExternalIdentity,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(
        id: ExternalIdentity,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            id,
            email,
            display_name,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Malformed, unsigned, wrongly signed or for another audience.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Key discovery or the provider itself failed.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Whether retrying the same token later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
