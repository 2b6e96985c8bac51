//! Postal code geocoding over HTTP.

mod http_geocoder;

pub use http_geocoder::{GeocodingConfig, HttpGeocoder};
