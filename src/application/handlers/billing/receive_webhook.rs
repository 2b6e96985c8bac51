//! BillingWebhookHandler - verifies an inbound delivery and hands it off.
//!
//! Only verification and parsing happen on the request path. Once the event
//! is authentic the caller acknowledges it and the processor takes over on a
//! detached task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::billing::{StripeWebhookVerifier, WebhookError};

use super::BillingEventProcessor;

/// An authenticated event that has been handed to the processor.
#[derive(Debug)]
pub struct WebhookAccepted {
    pub event_id: String,
    pub event_type: String,
    /// Handle of the detached processing task. Dropping it does not cancel it.
    pub task: JoinHandle<()>,
}

pub struct BillingWebhookHandler {
    verifier: StripeWebhookVerifier,
    processor: Arc<BillingEventProcessor>,
}

impl BillingWebhookHandler {
    pub fn new(verifier: StripeWebhookVerifier, processor: Arc<BillingEventProcessor>) -> Self {
        Self {
            verifier,
            processor,
        }
    }

    /// Verifies `payload` against `signature` and starts processing.
    ///
    /// # Errors
    ///
    /// Only rejections: `MissingSignature`, `InvalidSignature`,
    /// `TimestampOutOfRange`, `InvalidTimestamp` and `ParseError`. Nothing is
    /// written anywhere when this fails.
    pub fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookAccepted, WebhookError> {
        let signature = signature
            .filter(|s| !s.trim().is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let event = self
            .verifier
            .verify_and_parse(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "Rejected billing webhook");
                err
            })?;

        info!(event_id = %event.id, event_type = %event.event_type, "Accepted billing webhook");

        let event_id = event.id.clone();
        let event_type = event.event_type.clone();
        let task = self.processor.clone().spawn(event);

        Ok(WebhookAccepted {
            event_id,
            event_type,
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryGymRepository, InMemorySubscriptionLedger, InMemoryUserRepository,
        InMemoryWebhookEventRepository, RecordingNotifier, StaticBillingClient, StaticGeocoder,
    };
    use crate::application::handlers::gyms::NearestGymsService;
    use crate::application::handlers::notifications::NotificationDispatcher;
    use crate::domain::billing::sign_payload;
    use crate::ports::{WebhookEventRepository, WebhookOutcome};

    const SECRET: &str = "whsec_test_secret";

    fn handler() -> (BillingWebhookHandler, Arc<InMemoryWebhookEventRepository>) {
        let events = Arc::new(InMemoryWebhookEventRepository::new());
        let processor = BillingEventProcessor::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemorySubscriptionLedger::new()),
            Arc::new(StaticBillingClient::with_default_prices()),
            Arc::new(StaticGeocoder::new()),
            Arc::new(NearestGymsService::new(Arc::new(InMemoryGymRepository::new()))),
            Arc::new(NotificationDispatcher::new(Arc::new(RecordingNotifier::new()))),
            events.clone(),
        );
        (
            BillingWebhookHandler::new(StripeWebhookVerifier::new(SECRET), Arc::new(processor)),
            events,
        )
    }

    fn payload(event_type: &str) -> Vec<u8> {
        serde_json::json!({
            "id": "evt_hook_1",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "data": {"object": {}}
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn missing_signature_is_rejected_without_side_effects() {
        let (handler, events) = handler();

        let err = handler.handle(&payload("invoice.paid"), None).unwrap_err();

        assert!(matches!(err, WebhookError::MissingSignature));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let (handler, events) = handler();
        let body = payload("invoice.paid");
        let header = sign_payload("whsec_other", chrono::Utc::now().timestamp(), &body);

        let err = handler.handle(&body, Some(&header)).unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_with_valid_signature_is_rejected() {
        let (handler, _) = handler();
        let body = b"not json".to_vec();
        let header = sign_payload(SECRET, chrono::Utc::now().timestamp(), &body);

        let err = handler.handle(&body, Some(&header)).unwrap_err();

        assert!(matches!(err, WebhookError::ParseError(_)));
        assert_eq!(err.code(), "MALFORMED_PAYLOAD");
    }

    #[tokio::test]
    async fn valid_delivery_is_accepted_and_processed_in_background() {
        let (handler, events) = handler();
        let body = payload("invoice.paid");
        let header = sign_payload(SECRET, chrono::Utc::now().timestamp(), &body);

        let accepted = handler.handle(&body, Some(&header)).unwrap();
        assert_eq!(accepted.event_id, "evt_hook_1");
        accepted.task.await.unwrap();

        let record = events.find_by_event_id("evt_hook_1").await.unwrap().unwrap();
        assert_eq!(record.result, WebhookOutcome::Ignored);
    }
}
