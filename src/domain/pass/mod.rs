//! Pass module - issued access grants, their codes, and issuance errors.

mod aggregate;
mod code;
mod errors;

pub use aggregate::{GymPass, PassKind, PassStatus, PASS_VALIDITY_HOURS};
pub use code::PassCode;
pub use errors::PassError;
