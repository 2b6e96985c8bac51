//! Geocoding port.

use async_trait::async_trait;

use crate::domain::geo::Coordinate;

/// Resolves postal codes to coordinates.
///
/// Infallible by contract: no match, transport errors, and timeouts all
/// yield `None`, which callers treat as an unknown location.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, postal_code: &str) -> Option<Coordinate>;
}
