//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed storage for every repository port
//! - `memory` - In-process storage and fakes for tests and local runs
//! - `stripe` - Billing processor client
//! - `geocoding` - Postal-code geocoder
//! - `email` - Transactional mail notifier
//! - `auth` - Session token validation
//! - `http` - axum REST surface

pub mod auth;
pub mod email;
pub mod geocoding;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
