//! Gym pass persistence port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::pass::GymPass;

/// Constraint name reported when a pass code is already taken.
pub const PASS_CODE_CONSTRAINT: &str = "gym_passes_code_key";

#[async_trait]
pub trait PassRepository: Send + Sync {
    /// Persists a newly issued pass.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` with constraint [`PASS_CODE_CONSTRAINT`] on a code clash
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, pass: &GymPass) -> Result<(), DomainError>;
}
