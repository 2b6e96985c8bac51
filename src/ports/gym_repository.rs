//! Gym catalog port (read-only).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, GymId};
use crate::domain::gym::{Gym, GymFilter};

#[async_trait]
pub trait GymRepository: Send + Sync {
    async fn find_by_id(&self, id: GymId) -> Result<Option<Gym>, DomainError>;

    /// Gyms matching every predicate in `filter`, ordered by id.
    async fn search(&self, filter: &GymFilter) -> Result<Vec<Gym>, DomainError>;
}
