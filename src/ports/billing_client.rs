//! Billing processor client port.
//!
//! Constructed once at startup and injected wherever processor data is read,
//! so tests can substitute a fake.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::subscription::{BillingPeriod, PriceSnapshot, SubscriptionTier};

/// A subscription as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSubscription {
    pub id: String,
    pub customer_id: Option<String>,
    pub status: String,
    pub period: Option<BillingPeriod>,
}

/// Failures talking to the billing processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("Billing processor request failed: {0}")]
    Network(String),

    #[error("Billing processor rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No price configured for tier {0}")]
    PriceNotConfigured(SubscriptionTier),

    #[error("Unexpected billing processor response: {0}")]
    InvalidResponse(String),
}

impl BillingError {
    pub fn is_retryable(&self) -> bool {
        match self {
            BillingError::Network(_) => true,
            BillingError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Fetches a subscription by processor id; `None` when it does not exist.
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProcessorSubscription>, BillingError>;

    /// Current catalog price for a tier.
    async fn tier_price(&self, tier: SubscriptionTier) -> Result<PriceSnapshot, BillingError>;
}
