//! Error bodies and status mapping for the REST surface.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | `PassError::Unauthorized` | 401 |
//! | `PassError::Validation` | 400 |
//! | `PassError::QuotaExceeded` | 403 |
//! | `PassError::GymNotFound` | 404 |
//! | `PassError::Upstream` | 500 |
//! | `WebhookError` rejections | 400 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::billing::WebhookError;
use crate::domain::pass::PassError;

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable reason.
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Pass issuance failure as an HTTP response.
#[derive(Debug)]
pub struct PassApiError(pub PassError);

impl From<PassError> for PassApiError {
    fn from(err: PassError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PassApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PassError::Unauthorized => StatusCode::UNAUTHORIZED,
            PassError::Validation { .. } => StatusCode::BAD_REQUEST,
            PassError::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            PassError::GymNotFound(_) => StatusCode::NOT_FOUND,
            PassError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage details stay in the logs.
        let message = match &self.0 {
            PassError::Upstream(_) => "Pass could not be issued, try again later".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(self.0.code(), message))).into_response()
    }
}

/// Webhook rejection as an HTTP response.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.0.code(), self.0.to_string());
        (self.0.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::GymId;

    fn status_of(err: PassError) -> StatusCode {
        PassApiError(err).into_response().status()
    }

    #[test]
    fn pass_errors_map_to_statuses() {
        assert_eq!(status_of(PassError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(PassError::validation("gymId", "is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PassError::quota_exceeded("limit reached")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(PassError::GymNotFound(GymId::new(9))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PassError::upstream("pool timed out")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn upstream_message_is_not_leaked() {
        let response = PassApiError(PassError::upstream("relation gym_passes does not exist"))
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body.code, "UPSTREAM_FAILURE");
        assert!(!body.message.contains("gym_passes"));
    }

    #[test]
    fn webhook_rejections_are_bad_requests() {
        let response = WebhookApiError(WebhookError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
