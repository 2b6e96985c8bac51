//! Billing processor configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Secret API key (`sk_test_...` / `sk_live_...`)
    pub secret_key: String,

    /// Webhook signing secret (`whsec_...`)
    pub webhook_secret: String,

    pub standard_price_id: Option<String>,
    pub premium_price_id: Option<String>,
    pub elite_price_id: Option<String>,

    /// Overrides the public API endpoint, for stubs.
    pub api_base_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum age of a webhook signature.
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,
}

impl PaymentConfig {
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("payment.secret_key"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("payment.webhook_secret"));
        }
        if !self.secret_key.starts_with("sk_") {
            return Err(ValidationError::InvalidPaymentKey);
        }
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }
        if self.webhook_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidWebhookTolerance);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            webhook_secret: String::new(),
            standard_price_id: None,
            premium_price_id: None,
            elite_price_id: None,
            api_base_url: None,
            request_timeout_secs: default_request_timeout(),
            webhook_tolerance_secs: default_webhook_tolerance(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}

fn default_webhook_tolerance() -> i64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PaymentConfig {
        PaymentConfig {
            secret_key: "sk_test_abc".to_string(),
            webhook_secret: "whsec_xyz".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_keys_pass() {
        assert!(valid().validate().is_ok());
        assert!(!valid().is_live_mode());
    }

    #[test]
    fn publishable_key_is_rejected() {
        let config = PaymentConfig {
            secret_key: "pk_test_abc".to_string(),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPaymentKey));
    }

    #[test]
    fn webhook_secret_needs_prefix() {
        let config = PaymentConfig {
            webhook_secret: "secret".to_string(),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWebhookSecret));
    }

    #[test]
    fn tolerance_must_be_positive() {
        let config = PaymentConfig {
            webhook_tolerance_secs: 0,
            ..valid()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWebhookTolerance));
    }

    #[test]
    fn defaults() {
        let config = PaymentConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.webhook_tolerance_secs, 300);
    }
}
