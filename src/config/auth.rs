//! OIDC session token configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token issuer; JWKS is read from `{issuer_url}/.well-known/jwks.json`.
    pub issuer_url: String,

    pub audience: String,

    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    /// Plain HTTP issuers are only allowed outside production.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.issuer_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("auth.issuer_url"));
        }
        if self.audience.trim().is_empty() {
            return Err(ValidationError::MissingRequired("auth.audience"));
        }
        if environment == Environment::Production && !self.issuer_url.starts_with("https://") {
            return Err(ValidationError::IssuerMustBeHttps);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer_url: String::new(),
            audience: String::new(),
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_issuer_only_outside_production() {
        let config = AuthConfig {
            issuer_url: "http://localhost:8081".to_string(),
            audience: "gym-pass".to_string(),
            ..Default::default()
        };
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::IssuerMustBeHttps)
        );
    }

    #[test]
    fn audience_is_required() {
        let config = AuthConfig {
            issuer_url: "https://auth.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::MissingRequired("auth.audience"))
        );
    }

    #[test]
    fn cache_ttl_defaults_to_an_hour() {
        assert_eq!(AuthConfig::default().jwks_cache_ttl(), Duration::from_secs(3600));
    }
}
