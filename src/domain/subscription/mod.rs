//! Subscription module - the quota ledger's domain types.

mod status;
mod aggregate;
mod tier;
mod tier_limits;

pub use status::SubscriptionStatus;
pub use aggregate::{
    BillingPeriod, DebitOutcome, NewSubscription, PriceSnapshot, Subscription, UsageCounter,
};
pub use tier::SubscriptionTier;
pub use tier_limits::TierLimits;
