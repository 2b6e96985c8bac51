//! Billing webhook intake and event processing.

mod process_billing_event;
mod receive_webhook;

pub use process_billing_event::{BillingEventProcessor, BillingEventResult};
pub use receive_webhook::{BillingWebhookHandler, WebhookAccepted};
