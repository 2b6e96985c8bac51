//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `user` - Internal identity records
//! - `subscription` - Quota ledger rows, tiers, and limits
//! - `pass` - Issued gym passes and their codes
//! - `gym` - Partner gym catalog entries and filters
//! - `geo` - Coordinates and great-circle ranking
//! - `billing` - Billing processor events and signature verification

pub mod billing;
pub mod foundation;
pub mod geo;
pub mod gym;
pub mod pass;
pub mod subscription;
pub mod user;
