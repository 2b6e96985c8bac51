//! Fixed-response billing client for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::subscription::{PriceSnapshot, SubscriptionTier};
use crate::ports::{BillingClient, BillingError, ProcessorSubscription};

/// Serves prices and subscriptions from tables set up front.
///
/// Tiers without a configured price answer `PriceNotConfigured`, and
/// `failing()` makes every call return a network error.
#[derive(Default)]
pub struct StaticBillingClient {
    prices: HashMap<SubscriptionTier, PriceSnapshot>,
    subscriptions: Mutex<HashMap<String, ProcessorSubscription>>,
    fail_all: bool,
}

impl StaticBillingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default catalog: 29 / 49 / 89 USD per month.
    pub fn with_default_prices() -> Self {
        Self::new()
            .with_price(SubscriptionTier::Standard, PriceSnapshot::new(2900, "usd"))
            .with_price(SubscriptionTier::Premium, PriceSnapshot::new(4900, "usd"))
            .with_price(SubscriptionTier::Elite, PriceSnapshot::new(8900, "usd"))
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn with_price(mut self, tier: SubscriptionTier, price: PriceSnapshot) -> Self {
        self.prices.insert(tier, price);
        self
    }

    pub fn with_subscription(self, subscription: ProcessorSubscription) -> Self {
        if let Ok(mut subs) = self.subscriptions.lock() {
            subs.insert(subscription.id.clone(), subscription);
        }
        self
    }
}

#[async_trait]
impl BillingClient for StaticBillingClient {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProcessorSubscription>, BillingError> {
        if self.fail_all {
            return Err(BillingError::Network("static client set to fail".to_string()));
        }
        let subs = self
            .subscriptions
            .lock()
            .map_err(|_| BillingError::Network("lock poisoned".to_string()))?;
        Ok(subs.get(subscription_id).cloned())
    }

    async fn tier_price(&self, tier: SubscriptionTier) -> Result<PriceSnapshot, BillingError> {
        if self.fail_all {
            return Err(BillingError::Network("static client set to fail".to_string()));
        }
        self.prices
            .get(&tier)
            .cloned()
            .ok_or(BillingError::PriceNotConfigured(tier))
    }
}
