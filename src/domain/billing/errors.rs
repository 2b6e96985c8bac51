//! Billing webhook error types.
//!
//! Verification and parse failures are the only errors that reach the HTTP
//! response. Everything raised while applying an event happens after the
//! acknowledgement and ends up in logs and the processed-event ledger.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur while verifying or applying a billing event.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signature header was sent.
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signature timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing from the event.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Required field missing from the event object.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No user could be matched to the event.
    #[error("User not found")]
    UserNotFound,

    /// Storage operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A required external dependency failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),
}

impl WebhookError {
    /// True for failures raised before the event is accepted.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::ParseError(_)
        )
    }

    /// Returns true if a redelivery of the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::Upstream(_) | WebhookError::UserNotFound
        )
    }

    /// Stable machine-readable reason for rejections.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => "SIGNATURE_INVALID",
            WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => "MALFORMED_PAYLOAD",
            WebhookError::UserNotFound => "USER_NOT_FOUND",
            WebhookError::Database(_) => "DATABASE_ERROR",
            WebhookError::Upstream(_) => "UPSTREAM_FAILURE",
            WebhookError::Ignored(_) => "IGNORED",
        }
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Once the signature is valid the endpoint always answers 200, so only
    /// rejections carry a client error.
    pub fn status_code(&self) -> StatusCode {
        if self.is_rejection() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
