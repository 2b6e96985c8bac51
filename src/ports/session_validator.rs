//! Bearer token validation.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Turns a session token into the caller's provider identity.
///
/// Implementations check signature, issuer, audience and expiry. Errors:
/// `InvalidToken` for anything unverifiable, `TokenExpired` once `exp`
/// has passed, `ServiceUnavailable` when keys cannot be fetched.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `token` is the raw value after `Bearer `.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ExternalIdentity;
    use std::sync::Arc;

    /// Accepts exactly one token.
    struct SingleToken(&'static str);

    #[async_trait]
    impl SessionValidator for SingleToken {
        async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            if token != self.0 {
                return Err(AuthError::InvalidToken);
            }
            let id = ExternalIdentity::new("auth0|single").map_err(|_| AuthError::InvalidToken)?;
            Ok(AuthenticatedUser::new(id, None, None))
        }
    }

    #[tokio::test]
    async fn usable_behind_a_shared_pointer() {
        let validator: Arc<dyn SessionValidator> = Arc::new(SingleToken("good"));

        let user = validator.validate("good").await.unwrap();
        assert_eq!(user.id.as_str(), "auth0|single");
        assert!(matches!(
            validator.validate("bad").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
