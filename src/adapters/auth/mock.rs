//! Mock session validator for tests and local runs.
//!
//! ```ignore
//! let validator = MockSessionValidator::new().with_test_user("valid-token", "auth0|ana");
//! let user = validator.validate("valid-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, ExternalIdentity};
use crate::ports::SessionValidator;

/// Maps fixed tokens to users. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Returned for every validation when set.
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as `user`.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Accepts `token` as a user with a derived email and name.
    ///
    /// A blank `external_id` registers nothing.
    pub fn with_test_user(self, token: impl Into<String>, external_id: impl Into<String>) -> Self {
        let external_id = external_id.into();
        let Ok(id) = ExternalIdentity::new(external_id.as_str()) else {
            return self;
        };
        let user = AuthenticatedUser::new(
            id,
            Some(format!("{}@test.example.com", external_id.replace('|', "_"))),
            Some(format!("Test User {}", external_id)),
        );
        self.with_user(token, user)
    }

    /// Forces all validations to return `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        if let Ok(mut forced) = self.force_error.write() {
            *forced = Some(error);
        }
        self
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), user);
        }
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self.force_error.read().ok().and_then(|e| e.clone()) {
            return Err(error);
        }

        self.tokens
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator lock poisoned"))?
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_resolves_to_user() {
        let validator = MockSessionValidator::new().with_test_user("tok", "auth0|ana");

        let user = validator.validate("tok").await.unwrap();

        assert_eq!(user.id.as_str(), "auth0|ana");
        assert_eq!(user.email.as_deref(), Some("auth0_ana@test.example.com"));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockSessionValidator::new();
        assert!(matches!(
            validator.validate("nope").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let validator = MockSessionValidator::new()
            .with_test_user("tok", "auth0|ana")
            .with_error(AuthError::service_unavailable("down"));

        let err = validator.validate("tok").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn tokens_can_be_added_at_runtime() {
        let validator = MockSessionValidator::new();
        validator.add_token(
            "late",
            AuthenticatedUser::new(ExternalIdentity::new("x").unwrap(), None, None),
        );
        assert!(validator.validate("late").await.is_ok());
    }
}
