//! Transactional email configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Mail API key (`re_...`)
    pub api_key: String,

    pub api_base_url: Option<String>,

    #[serde(default = "default_from_email")]
    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Hosted template rendered for new subscribers
    pub welcome_template_id: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl EmailConfig {
    /// `From` header value, e.g. `Gym Pass <hello@gympass.example>`.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("email.api_key"));
        }
        if !self.api_key.starts_with("re_") {
            return Err(ValidationError::InvalidEmailKey);
        }
        if self.welcome_template_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("email.welcome_template_id"));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: None,
            from_email: default_from_email(),
            from_name: default_from_name(),
            welcome_template_id: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_from_email() -> String {
    "hello@gympass.example".to_string()
}

fn default_from_name() -> String {
    "Gym Pass".to_string()
}

fn default_request_timeout() -> u64 {
    5
}
