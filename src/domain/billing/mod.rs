//! Billing module - inbound processor events and their verification.

mod checkout;
mod errors;
mod event;
mod subscription_change;
mod verifier;

pub use checkout::{CheckoutCompleted, UserReference};
pub use errors::WebhookError;
pub use event::{StripeEvent, StripeEventData, StripeEventType};
pub use subscription_change::{SubscriptionChange, SubscriptionObject};
pub use verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS};
