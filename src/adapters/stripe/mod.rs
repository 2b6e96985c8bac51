//! Stripe billing processor adapter.
//!
//! Reads subscriptions and catalog prices over the Stripe REST API. Webhook
//! verification lives in `domain::billing` since it needs no I/O.
//!
//! All secrets are handled via `secrecy::SecretString`.

mod billing_client;

pub use billing_client::{StripeBillingClient, StripeConfig, TierPriceIds};
