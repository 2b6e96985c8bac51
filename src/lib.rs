//! gym-pass - quota-gated gym pass issuance with billing reconciliation.
//!
//! Members hold a tiered monthly subscription with a visit allowance. Each
//! pass request atomically debits that allowance. Billing processor webhooks
//! activate, update and cancel subscriptions and send a welcome email that
//! lists the gyms nearest the member's home.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
