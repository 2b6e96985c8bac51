//! ResolveIdentityHandler - finds or lazily creates the caller's user record.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{AuthenticatedUser, DomainError, ExternalIdentity};
use crate::domain::user::{NewUser, User};
use crate::ports::UserRepository;

/// Command to resolve an external identity to a user.
#[derive(Debug, Clone)]
pub struct ResolveIdentityCommand {
    pub external_id: ExternalIdentity,
    /// Used only when the user is created.
    pub email_hint: Option<String>,
    /// Used only when the user is created.
    pub name_hint: Option<String>,
}

impl From<&AuthenticatedUser> for ResolveIdentityCommand {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            external_id: user.id.clone(),
            email_hint: user.email.clone(),
            name_hint: user.display_name.clone(),
        }
    }
}

/// Handler for resolving identities.
///
/// Creation races are settled by the storage uniqueness constraint: insert
/// first, and on a conflict re-select the row the other request created.
pub struct ResolveIdentityHandler {
    users: Arc<dyn UserRepository>,
}

impl ResolveIdentityHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, cmd: ResolveIdentityCommand) -> Result<User, DomainError> {
        // 1. Existing record wins; hints are ignored from here on
        if let Some(user) = self.users.find_by_external_id(&cmd.external_id).await? {
            return Ok(user);
        }

        // 2. First sight: create
        let new_user = NewUser {
            external_id: cmd.external_id.clone(),
            email: cmd.email_hint,
            display_name: cmd.name_hint,
        };

        match self.users.insert(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "Created user on first access");
                Ok(user)
            }
            // 3. Lost the creation race: the winner's row is now visible
            Err(err) if err.is_unique_violation() => {
                debug!(external_id = %cmd.external_id, "Concurrent user creation, re-selecting");
                self.users
                    .find_by_external_id(&cmd.external_id)
                    .await?
                    .ok_or(err)
            }
            Err(err) => {
                // The insert may have committed before the error surfaced.
                match self.users.find_by_external_id(&cmd.external_id).await {
                    Ok(Some(user)) => Ok(user),
                    _ => Err(err),
                }
            }
        }
    }
}
