//! Stripe implementation of the `BillingClient` port.
//!
//! Constructed once at startup and shared by the pass issuer and the billing
//! event processor.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::billing::SubscriptionObject;
use crate::domain::subscription::{PriceSnapshot, SubscriptionTier};
use crate::ports::{BillingClient, BillingError, ProcessorSubscription};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Price ids for each tier in the processor catalog.
#[derive(Debug, Clone, Default)]
pub struct TierPriceIds {
    pub standard: Option<String>,
    pub premium: Option<String>,
    pub elite: Option<String>,
}

impl TierPriceIds {
    pub fn for_tier(&self, tier: SubscriptionTier) -> Option<&str> {
        match tier {
            SubscriptionTier::Standard => self.standard.as_deref(),
            SubscriptionTier::Premium => self.premium.as_deref(),
            SubscriptionTier::Elite => self.elite.as_deref(),
        }
    }
}

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_live_...` or `sk_test_...`).
    api_key: SecretString,
    api_base_url: String,
    timeout: Duration,
    prices: TierPriceIds,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, prices: TierPriceIds) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            prices,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("prices", &self.prices)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct StripePrice {
    id: String,
    unit_amount: Option<i64>,
    currency: String,
}

impl TryFrom<StripePrice> for PriceSnapshot {
    type Error = BillingError;

    fn try_from(price: StripePrice) -> Result<Self, Self::Error> {
        let amount = price.unit_amount.ok_or_else(|| {
            BillingError::InvalidResponse(format!("price {} has no unit amount", price.id))
        })?;
        Ok(PriceSnapshot::new(amount, price.currency))
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe billing client.
pub struct StripeBillingClient {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeBillingClient {
    pub fn new(config: StripeConfig) -> Result<Self, BillingError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BillingError::Network(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// GETs `path`, mapping 404 to `None`.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, BillingError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| BillingError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BillingError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| BillingError::InvalidResponse(e.to_string()))
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<StripeErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl BillingClient for StripeBillingClient {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProcessorSubscription>, BillingError> {
        let subscription: Option<SubscriptionObject> = self
            .get_json(&format!("/v1/subscriptions/{}", subscription_id))
            .await?;

        Ok(subscription.map(|sub| ProcessorSubscription {
            period: sub.period(),
            id: sub.id,
            customer_id: sub.customer,
            status: sub.status,
        }))
    }

    async fn tier_price(&self, tier: SubscriptionTier) -> Result<PriceSnapshot, BillingError> {
        let price_id = self
            .config
            .prices
            .for_tier(tier)
            .ok_or(BillingError::PriceNotConfigured(tier))?;

        let price: StripePrice = self
            .get_json(&format!("/v1/prices/{}", price_id))
            .await?
            .ok_or_else(|| BillingError::InvalidResponse(format!("price {} not found", price_id)))?;

        price.try_into()
    }
}
