//! Application handlers.
//!
//! Command handlers and services that orchestrate domain operations over
//! the ports.

pub mod billing;
pub mod gyms;
pub mod identity;
pub mod notifications;
pub mod passes;

pub use billing::{BillingEventProcessor, BillingEventResult, BillingWebhookHandler, WebhookAccepted};
pub use gyms::{NearbyGym, NearestGymsService};
pub use identity::{ResolveIdentityCommand, ResolveIdentityHandler};
pub use notifications::{NotificationDispatcher, WelcomeMessage};
pub use passes::{IssuePassCommand, IssuePassHandler, IssuePassResult};
