//! Pass issuance errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Unauthorized | 401 |
//! | Validation | 400 |
//! | QuotaExceeded | 403 |
//! | GymNotFound | 404 |
//! | Upstream | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, GymId};

/// Failures surfaced by pass issuance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error("Authentication is required")]
    Unauthorized,

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Gym not found: {0}")]
    GymNotFound(GymId),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl PassError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PassError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn quota_exceeded(reason: impl Into<String>) -> Self {
        PassError::QuotaExceeded(reason.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        PassError::Upstream(message.into())
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            PassError::Unauthorized => "UNAUTHORIZED",
            PassError::Validation { .. } => "VALIDATION_FAILED",
            PassError::GymNotFound(_) => "GYM_NOT_FOUND",
            PassError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            PassError::Upstream(_) => "UPSTREAM_FAILURE",
        }
    }
}

impl From<DomainError> for PassError {
    fn from(err: DomainError) -> Self {
        PassError::Upstream(err.to_string())
    }
}
