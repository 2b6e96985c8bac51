//! Application layer - command handlers and the services they share.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Nothing here knows about HTTP or SQL.

pub mod handlers;

pub use handlers::{
    // Billing
    BillingEventProcessor, BillingEventResult, BillingWebhookHandler, WebhookAccepted,
    // Identity
    ResolveIdentityCommand, ResolveIdentityHandler,
    // Passes
    IssuePassCommand, IssuePassHandler, IssuePassResult,
    // Shared services
    NearbyGym, NearestGymsService, NotificationDispatcher, WelcomeMessage,
};
