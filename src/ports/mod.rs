//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement them.
//!
//! ## Storage Ports
//!
//! - `UserRepository` - Identity records keyed by external identity
//! - `SubscriptionLedger` - Quota counters with atomic debit and replace
//! - `GymRepository` - Read-only gym catalog
//! - `PassRepository` - Issued passes
//! - `WebhookEventRepository` - Processed billing event ledger
//!
//! ## External Service Ports
//!
//! - `BillingClient` - Billing processor API
//! - `Geocoder` - Postal code to coordinates
//! - `WelcomeNotifier` - Transactional welcome message
//! - `SessionValidator` - Bearer token validation

mod billing_client;
mod geocoder;
mod gym_repository;
mod pass_repository;
mod session_validator;
mod subscription_ledger;
mod user_repository;
mod webhook_event_repository;
mod welcome_notifier;

pub use billing_client::{BillingClient, BillingError, ProcessorSubscription};
pub use geocoder::Geocoder;
pub use gym_repository::GymRepository;
pub use pass_repository::{PassRepository, PASS_CODE_CONSTRAINT};
pub use session_validator::SessionValidator;
pub use subscription_ledger::SubscriptionLedger;
pub use user_repository::UserRepository;
pub use webhook_event_repository::{
    ClaimResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, STALE_CLAIM_SECS,
};
pub use welcome_notifier::{GymSlot, NotificationError, WelcomeNotifier, WelcomeTemplate};
