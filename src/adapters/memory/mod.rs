//! In-process adapters.
//!
//! Each storage adapter holds its state behind one `Mutex` and performs every
//! port operation under a single lock acquisition, which gives the same
//! atomicity the Postgres adapters get from conditional statements. Used by
//! the test suites and for running the service without a database.

mod billing;
mod geocoder;
mod gyms;
mod ledger;
mod notifier;
mod passes;
mod users;
mod webhook_events;

pub use billing::StaticBillingClient;
pub use geocoder::StaticGeocoder;
pub use gyms::InMemoryGymRepository;
pub use ledger::InMemorySubscriptionLedger;
pub use notifier::RecordingNotifier;
pub use passes::InMemoryPassRepository;
pub use users::InMemoryUserRepository;
pub use webhook_events::InMemoryWebhookEventRepository;

use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::DomainError;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::database("in-memory store lock poisoned"))
}
