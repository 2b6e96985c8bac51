//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresUserRepository` - identity records
//! - `PostgresSubscriptionLedger` - quota counters with conditional updates
//! - `PostgresGymRepository` - catalog queries built from `GymFilter`
//! - `PostgresPassRepository` - issued passes
//! - `PostgresWebhookEventRepository` - processed billing event ledger

mod gym_repository;
mod pass_repository;
mod subscription_ledger;
mod user_repository;
mod webhook_event_repository;

pub use gym_repository::PostgresGymRepository;
pub use pass_repository::PostgresPassRepository;
pub use subscription_ledger::PostgresSubscriptionLedger;
pub use user_repository::PostgresUserRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx error, surfacing unique violations with their constraint name.
pub(crate) fn map_sqlx_error(context: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DomainError::unique_violation(db_err.constraint().unwrap_or("unknown"));
        }
    }
    DomainError::database(format!("{}: {}", context, err))
}

/// Error for a stored value that no longer parses.
pub(crate) fn corrupt(column: &str, value: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, value),
    )
}
