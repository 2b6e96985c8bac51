//! OIDC session validator.
//!
//! Validates bearer JWTs against the issuer's JWKS. Keys are fetched lazily
//! on first use and cached for a configurable duration.
//!
//! # Security
//!
//! - Signature verified with the key matching the token's `kid`
//! - Issuer, audience and expiry are always validated
//! - Only asymmetric algorithms are accepted

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{JwkSet, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::foundation::{AuthError, AuthenticatedUser, ExternalIdentity};
use crate::ports::SessionValidator;

const DEFAULT_JWKS_TTL: Duration = Duration::from_secs(3600);
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Issuer URL; also the base for JWKS discovery.
    pub issuer_url: String,
    pub audience: String,
    pub jwks_cache_ttl: Duration,
}

impl OidcConfig {
    pub fn new(issuer_url: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            audience: audience.into(),
            jwks_cache_ttl: DEFAULT_JWKS_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
}

impl Claims {
    fn into_user(self) -> Result<AuthenticatedUser, AuthError> {
        let id = ExternalIdentity::new(self.sub).map_err(|_| AuthError::InvalidToken)?;
        let email = self.email.filter(|e| e.contains('@'));
        let display_name = self
            .name
            .or(self.preferred_username)
            .filter(|n| !n.trim().is_empty());
        Ok(AuthenticatedUser::new(id, email, display_name))
    }
}

struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

pub struct OidcSessionValidator {
    config: OidcConfig,
    http_client: reqwest::Client,
    cache: RwLock<Option<CachedJwks>>,
}

impl OidcSessionValidator {
    pub fn new(config: OidcConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            cache: RwLock::new(None),
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();
        debug!(url = %url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::service_unavailable(format!("JWKS fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::service_unavailable(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::service_unavailable(format!("JWKS parse failed: {}", e)))
    }

    async fn jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.config.jwks_cache_ttl {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        *self.cache.write().await = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.issuer_url]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

fn signing_key(header: &Header, jwks: &JwkSet) -> Result<(DecodingKey, Algorithm), AuthError> {
    let kid = header.kid.as_deref().ok_or(AuthError::InvalidToken)?;
    let jwk = jwks.find(kid).ok_or_else(|| {
        warn!(kid = %kid, "No JWKS key matches token");
        AuthError::InvalidToken
    })?;

    let algorithm = match jwk.common.key_algorithm {
        Some(KeyAlgorithm::RS256) | None => Algorithm::RS256,
        Some(KeyAlgorithm::RS384) => Algorithm::RS384,
        Some(KeyAlgorithm::RS512) => Algorithm::RS512,
        Some(KeyAlgorithm::ES256) => Algorithm::ES256,
        Some(KeyAlgorithm::ES384) => Algorithm::ES384,
        Some(other) => {
            warn!(algorithm = ?other, "Unsupported JWKS key algorithm");
            return Err(AuthError::InvalidToken);
        }
    };

    let key = DecodingKey::from_jwk(jwk).map_err(|_| AuthError::InvalidToken)?;
    Ok((key, algorithm))
}

#[async_trait]
impl SessionValidator for OidcSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let jwks = self.jwks().await?;
        let (key, algorithm) = signing_key(&header, &jwks)?;

        let data = decode::<Claims>(token, &key, &self.validation(algorithm)).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    debug!(error = %e, "Token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;

        data.claims.into_user()
    }
}

impl std::fmt::Debug for OidcSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcSessionValidator")
            .field("issuer_url", &self.config.issuer_url)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}
