//! Geocoder backed by a Google-style geocoding JSON API.
//!
//! Every failure (transport, timeout, non-OK status, empty result) becomes
//! `None` and is logged at warn.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use crate::domain::geo::Coordinate;
use crate::ports::Geocoder;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DEFAULT_REGION: &str = "us";
const DEFAULT_TIMEOUT_SECS: u64 = 3;

#[derive(Clone)]
pub struct GeocodingConfig {
    api_key: SecretString,
    base_url: String,
    region: String,
    timeout: Duration,
}

impl GeocodingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn first_coordinate(&self) -> Option<Coordinate> {
        if self.status != "OK" {
            return None;
        }
        self.results
            .first()
            .and_then(|r| Coordinate::from_parts(Some(r.geometry.location.lat), Some(r.geometry.location.lng)))
    }
}

pub struct HttpGeocoder {
    config: GeocodingConfig,
    http_client: reqwest::Client,
}

impl HttpGeocoder {
    pub fn new(config: GeocodingConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn lookup(&self, postal_code: &str) -> Result<GeocodeResponse, reqwest::Error> {
        let components = format!("postal_code:{}|country:{}", postal_code, self.config.region);
        self.http_client
            .get(&self.config.base_url)
            .query(&[
                ("components", components.as_str()),
                ("region", self.config.region.as_str()),
                ("key", self.config.api_key.expose_secret().as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, postal_code: &str) -> Option<Coordinate> {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            return None;
        }

        match self.lookup(postal_code).await {
            Ok(response) => {
                let coordinate = response.first_coordinate();
                if coordinate.is_none() {
                    warn!(postal_code = %postal_code, status = %response.status, "Postal code not geocoded");
                }
                coordinate
            }
            Err(err) => {
                // reqwest errors can echo the URL, which carries the API key.
                warn!(postal_code = %postal_code, error = %err.without_url(), "Geocoding request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_yields_first_location() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [
                    {"geometry": {"location": {"lat": 40.7506, "lng": -73.9972}}},
                    {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.first_coordinate(), Some(Coordinate::new(40.7506, -73.9972)));
    }

    #[test]
    fn zero_results_yields_none() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert_eq!(response.first_coordinate(), None);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GeocodingConfig::new("AIzaSecret");
        assert!(!format!("{:?}", config).contains("AIzaSecret"));
    }

    #[tokio::test]
    async fn transport_failure_is_none() {
        let geocoder = HttpGeocoder::new(
            GeocodingConfig::new("key")
                .with_base_url("http://127.0.0.1:1/geocode")
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        assert_eq!(geocoder.geocode("10001").await, None);
    }

    #[tokio::test]
    async fn blank_postal_code_is_none() {
        let geocoder = HttpGeocoder::new(GeocodingConfig::new("key")).unwrap();
        assert_eq!(geocoder.geocode("  ").await, None);
    }
}
