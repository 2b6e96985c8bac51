//! User repository port.
//!
//! The external identity column is unique; `insert` reports a clash as
//! `ErrorCode::UniqueViolation` so callers can re-select instead of failing.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ExternalIdentity, UserId};
use crate::domain::user::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_external_id(
        &self,
        external_id: &ExternalIdentity,
    ) -> Result<Option<User>, DomainError>;

    /// Finds the user a billing processor customer reference was stored on.
    async fn find_by_billing_customer(&self, customer_id: &str)
        -> Result<Option<User>, DomainError>;

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` if a user with the same external identity exists
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, user: NewUser) -> Result<User, DomainError>;

    /// Stores the processor customer reference. Overwriting is allowed.
    async fn set_billing_customer(&self, id: &UserId, customer_id: &str)
        -> Result<(), DomainError>;

    async fn set_postal_code(&self, id: &UserId, postal_code: &str) -> Result<(), DomainError>;
}
