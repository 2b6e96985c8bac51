//! Postgres pool settings.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` connection string. Required.
    pub url: String,
    pub min_connections: u32,
    /// At most 100.
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Apply `migrations/` before serving.
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 5,
            max_connections: 20,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            run_migrations: false,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        let scheme_ok = url.starts_with("postgres://") || url.starts_with("postgresql://");
        if !scheme_ok {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        match (self.min_connections, self.max_connections) {
            (_, max) if max > 100 => Err(ValidationError::PoolSizeTooLarge),
            (min, max) if min > max => Err(ValidationError::InvalidPoolSize),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(url: &str, min: u32, max: u32) -> DatabaseConfig {
        DatabaseConfig {
            url: url.into(),
            min_connections: min,
            max_connections: max,
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn accepts_either_postgres_scheme() {
        assert!(pool("postgres://localhost/gym_pass", 5, 20).validate().is_ok());
        assert!(pool("postgresql://app@db:5432/gym_pass", 1, 1).validate().is_ok());
    }

    #[test]
    fn url_is_required_and_must_be_postgres() {
        assert_eq!(
            pool("  ", 5, 20).validate(),
            Err(ValidationError::MissingRequired("database.url"))
        );
        assert_eq!(
            pool("sqlite://gym.db", 5, 20).validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn pool_sizes_are_bounded() {
        let url = "postgres://localhost/gym_pass";
        assert_eq!(pool(url, 5, 101).validate(), Err(ValidationError::PoolSizeTooLarge));
        assert_eq!(pool(url, 10, 4).validate(), Err(ValidationError::InvalidPoolSize));
        assert!(pool(url, 0, 100).validate().is_ok());
    }

    #[test]
    fn timeouts_default_to_pool_friendly_values() {
        let config = DatabaseConfig::default();
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
        assert_eq!(config.max_lifetime(), Duration::from_secs(1800));
    }
}
