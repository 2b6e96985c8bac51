//! Postal-code geocoder configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    pub api_key: String,

    pub api_base_url: Option<String>,

    /// Region bias passed with every lookup
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl GeocodingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("geocoding.api_key"));
        }
        Ok(())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: None,
            region: default_region(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_region() -> String {
    "us".to_string()
}

fn default_request_timeout() -> u64 {
    3
}
