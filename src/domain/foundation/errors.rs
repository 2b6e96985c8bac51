//! Domain and value-object errors.
//!
//! Ports return [`DomainError`]; handlers translate it into their own error
//! enums (`PassError`, `WebhookError`). Only uniqueness conflicts are
//! inspected by callers, everything else is reported as-is.

use std::fmt;
use thiserror::Error;

/// Rejected value-object input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyField,
    InvalidFormat,
    UserNotFound,
    UniqueViolation,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::UniqueViolation => "UNIQUE_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage or invariant failure raised below the handlers.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    constraint: Option<String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            constraint: None,
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// A concurrent writer already holds the unique key named by `constraint`.
    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        let constraint = constraint.into();
        Self {
            code: ErrorCode::UniqueViolation,
            message: format!("Unique constraint violated: {}", constraint),
            constraint: Some(constraint),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code == ErrorCode::UniqueViolation
    }

    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_the_code() {
        let err = DomainError::database("pool timed out");
        assert_eq!(err.to_string(), "[DATABASE_ERROR] pool timed out");
    }

    #[test]
    fn unique_violation_names_its_constraint() {
        let err = DomainError::unique_violation("passes_code_key");
        assert!(err.is_unique_violation());
        assert_eq!(err.constraint(), Some("passes_code_key"));
        assert!(err.to_string().contains("passes_code_key"));
    }

    #[test]
    fn other_errors_carry_no_constraint() {
        let err = DomainError::new(ErrorCode::UserNotFound, "gone");
        assert!(!err.is_unique_violation());
        assert!(err.constraint().is_none());
    }

    #[test]
    fn bad_input_keeps_its_kind() {
        let blank: DomainError = ValidationError::empty_field("external_id").into();
        assert_eq!(blank.code, ErrorCode::EmptyField);

        let malformed: DomainError = ValidationError::invalid_format("tier", "unknown").into();
        assert_eq!(malformed.code, ErrorCode::InvalidFormat);
        assert_eq!(
            malformed.message,
            "Field 'tier' has invalid format: unknown"
        );
    }
}
