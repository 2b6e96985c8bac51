//! In-memory user repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ExternalIdentity, Timestamp, UserId};
use crate::domain::user::{NewUser, User};
use crate::ports::UserRepository;

use super::lock;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update<F>(&self, id: &UserId, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut User),
    {
        let mut users = lock(&self.users)?;
        match users.get_mut(id) {
            Some(user) => {
                apply(user);
                Ok(())
            }
            None => Err(DomainError::new(
                crate::domain::foundation::ErrorCode::UserNotFound,
                format!("User not found: {}", id),
            )),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(lock(&self.users)?.get(id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalIdentity,
    ) -> Result<Option<User>, DomainError> {
        Ok(lock(&self.users)?
            .values()
            .find(|u| &u.external_id == external_id)
            .cloned())
    }

    async fn find_by_billing_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<User>, DomainError> {
        Ok(lock(&self.users)?
            .values()
            .find(|u| u.billing_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.external_id == user.external_id) {
            return Err(DomainError::unique_violation("users_external_id_key"));
        }
        let user = user.into_user(Timestamp::now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_billing_customer(
        &self,
        id: &UserId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        self.update(id, |u| u.billing_customer_id = Some(customer_id.to_string()))
    }

    async fn set_postal_code(&self, id: &UserId, postal_code: &str) -> Result<(), DomainError> {
        self.update(id, |u| u.postal_code = Some(postal_code.to_string()))
    }
}
