//! Configuration failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be read or did not deserialize into `AppConfig`.
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration is invalid: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that cannot be used as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("Cannot bind to {0}")]
    InvalidBindAddress(String),

    #[error("server.port cannot be 0")]
    InvalidPort,

    #[error("server.request_timeout_secs must be within 1..=300")]
    InvalidTimeout,

    #[error("database.url must be a postgres:// URL")]
    InvalidDatabaseUrl,

    #[error("database.min_connections is larger than database.max_connections")]
    InvalidPoolSize,

    #[error("database.max_connections cannot exceed 100")]
    PoolSizeTooLarge,

    #[error("auth.issuer_url must be https in production")]
    IssuerMustBeHttps,

    #[error("payment.secret_key must start with sk_")]
    InvalidPaymentKey,

    #[error("payment.webhook_secret must start with whsec_")]
    InvalidWebhookSecret,

    #[error("payment.webhook_tolerance_secs must be positive")]
    InvalidWebhookTolerance,

    #[error("email.api_key must start with re_")]
    InvalidEmailKey,

    #[error("email.from_email is not an address")]
    InvalidFromEmail,
}
