//! User module - internal identity records keyed by external identity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ExternalIdentity, Timestamp, UserId};

/// Internal user record.
///
/// Created lazily on first authenticated access and never deleted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalIdentity,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub postal_code: Option<String>,
    /// Billing processor customer reference, set on first purchase.
    pub billing_customer_id: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// Name to greet the user with, falling back to the email local part.
    pub fn greeting_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .unwrap_or("there")
            .to_string()
    }
}

/// Hints supplied when a user is created on first sight.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub external_id: ExternalIdentity,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl NewUser {
    pub fn into_user(self, now: Timestamp) -> User {
        User {
            id: UserId::new(),
            external_id: self.external_id,
            email: self.email,
            display_name: self.display_name,
            postal_code: None,
            billing_customer_id: None,
            created_at: now,
        }
    }
}
