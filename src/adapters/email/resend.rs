//! Resend implementation of the `WelcomeNotifier` port.
//!
//! Sends the welcome message through a stored template, passing the
//! fixed-shape `WelcomeTemplate` as template variables.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::ports::{NotificationError, WelcomeNotifier, WelcomeTemplate};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct ResendConfig {
    api_key: SecretString,
    api_base_url: String,
    from: String,
    welcome_template_id: String,
    timeout: Duration,
}

impl ResendConfig {
    /// `from` is a full header value, e.g. `Gym Pass <hello@example.com>`.
    pub fn new(
        api_key: impl Into<String>,
        from: impl Into<String>,
        welcome_template_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            from: from.into(),
            welcome_template_id: welcome_template_id.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("from", &self.from)
            .field("welcome_template_id", &self.welcome_template_id)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    template: TemplateRef<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateRef<'a> {
    id: &'a str,
    variables: &'a WelcomeTemplate,
}

pub struct ResendNotifier {
    config: ResendConfig,
    http_client: reqwest::Client,
}

impl ResendNotifier {
    pub fn new(config: ResendConfig) -> Result<Self, NotificationError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn request<'a>(&'a self, to: &'a str, template: &'a WelcomeTemplate) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.config.from,
            to: [to],
            template: TemplateRef {
                id: &self.config.welcome_template_id,
                variables: template,
            },
        }
    }
}

#[async_trait]
impl WelcomeNotifier for ResendNotifier {
    async fn send_welcome(
        &self,
        to: &str,
        template: &WelcomeTemplate,
    ) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(format!("{}/emails", self.config.api_base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.request(to, template))
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GymSlot;

    fn template() -> WelcomeTemplate {
        WelcomeTemplate {
            first_name: "Ana".to_string(),
            tier: "Premium".to_string(),
            monthly_visits: 20,
            guest_passes: 2,
            gym1: GymSlot {
                name: "Iron Temple".to_string(),
                address: "1 Main St".to_string(),
                distance: "1.2 km".to_string(),
            },
            gym2: GymSlot::default(),
            gym3: GymSlot::default(),
        }
    }

    #[test]
    fn request_body_carries_template_variables() {
        let notifier = ResendNotifier::new(ResendConfig::new(
            "re_test",
            "Gym Pass <hello@example.com>",
            "tmpl_welcome",
        ))
        .unwrap();
        let template = template();

        let body = serde_json::to_value(notifier.request("ana@example.com", &template)).unwrap();

        assert_eq!(body["from"], "Gym Pass <hello@example.com>");
        assert_eq!(body["to"], serde_json::json!(["ana@example.com"]));
        assert_eq!(body["template"]["id"], "tmpl_welcome");
        assert_eq!(body["template"]["variables"]["gym1"]["name"], "Iron Temple");
        assert_eq!(body["template"]["variables"]["gym3"]["distance"], "");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ResendConfig::new("re_supersecret", "a@b.c", "tmpl");
        assert!(!format!("{:?}", config).contains("supersecret"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let notifier = ResendNotifier::new(
            ResendConfig::new("re_test", "a@b.c", "tmpl")
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let err = notifier.send_welcome("ana@example.com", &template()).await.unwrap_err();

        assert!(matches!(err, NotificationError::Transport(_)));
    }
}
