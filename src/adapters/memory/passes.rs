//! In-memory pass store.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::DomainError;
use crate::domain::pass::GymPass;
use crate::ports::{PassRepository, PASS_CODE_CONSTRAINT};

use super::lock;

#[derive(Default)]
pub struct InMemoryPassRepository {
    passes: Mutex<Vec<GymPass>>,
}

impl InMemoryPassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.passes.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PassRepository for InMemoryPassRepository {
    async fn insert(&self, pass: &GymPass) -> Result<(), DomainError> {
        let mut passes = lock(&self.passes)?;
        if passes.iter().any(|p| p.code == pass.code) {
            return Err(DomainError::unique_violation(PASS_CODE_CONSTRAINT));
        }
        passes.push(pass.clone());
        Ok(())
    }
}
