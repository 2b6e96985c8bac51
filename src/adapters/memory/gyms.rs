//! In-memory gym catalog.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, GymId};
use crate::domain::gym::{Gym, GymFilter};
use crate::ports::GymRepository;

use super::lock;

#[derive(Default)]
pub struct InMemoryGymRepository {
    gyms: Mutex<Vec<Gym>>,
}

impl InMemoryGymRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gyms(gyms: Vec<Gym>) -> Self {
        Self {
            gyms: Mutex::new(gyms),
        }
    }
}

#[async_trait]
impl GymRepository for InMemoryGymRepository {
    async fn find_by_id(&self, id: GymId) -> Result<Option<Gym>, DomainError> {
        Ok(lock(&self.gyms)?.iter().find(|g| g.id == id).cloned())
    }

    async fn search(&self, filter: &GymFilter) -> Result<Vec<Gym>, DomainError> {
        let mut found: Vec<Gym> = lock(&self.gyms)?
            .iter()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect();
        found.sort_by_key(|g| g.id);
        if let Some(limit) = filter.limit {
            found.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        }
        Ok(found)
    }
}
