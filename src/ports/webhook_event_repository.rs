//! WebhookEventRepository port - processed-event ledger for billing webhooks.
//!
//! The processor may deliver the same event several times. Each delivery first
//! *claims* the event id; only the delivery holding the claim applies the
//! event. A claim whose attempt ended in `failed`, or that has sat in
//! `processing` for longer than [`STALE_CLAIM_SECS`], can be taken again so a
//! redelivery gets another chance.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::foundation::DomainError;

/// A `processing` claim older than this belongs to a task that was lost
/// (for example a restart mid-flight) and may be re-granted.
pub const STALE_CLAIM_SECS: i64 = 15 * 60;

/// Lifecycle of a claimed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Claimed; the handler has not finished yet.
    Processing,
    Success,
    Ignored,
    Failed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Processing => "processing",
            WebhookOutcome::Success => "success",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(WebhookOutcome::Processing),
            "success" => Some(WebhookOutcome::Success),
            "ignored" => Some(WebhookOutcome::Ignored),
            "failed" => Some(WebhookOutcome::Failed),
            _ => None,
        }
    }
}

/// Record of a claimed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Processor event id (`evt_xxx`).
    pub event_id: String,
    pub event_type: String,
    /// Last time the record changed.
    pub processed_at: DateTime<Utc>,
    pub result: WebhookOutcome,
    pub error_message: Option<String>,
    /// Original event payload for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    /// A fresh claim for an event that has not been seen before.
    pub fn claim(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            result: WebhookOutcome::Processing,
            error_message: None,
            payload,
        }
    }

    /// Whether a delivery arriving at `now` may take over this claim.
    pub fn is_reclaimable_at(&self, now: DateTime<Utc>) -> bool {
        match self.result {
            WebhookOutcome::Failed => true,
            WebhookOutcome::Processing => {
                self.processed_at < now - Duration::seconds(STALE_CLAIM_SECS)
            }
            WebhookOutcome::Success | WebhookOutcome::Ignored => false,
        }
    }
}

/// Result of attempting to claim an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This delivery owns the event and must apply it.
    Claimed,
    /// Another delivery already applied (or is applying) the event.
    AlreadyProcessed,
}

/// Port for the processed-event ledger.
///
/// Implementations must make `try_claim` atomic (a primary key on
/// `event_id` plus a conditional upsert) so that concurrent deliveries of
/// one event never both receive `Claimed`.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Claims `record.event_id`, re-granting a failed or stale claim.
    async fn try_claim(&self, record: WebhookEventRecord) -> Result<ClaimResult, DomainError>;

    /// Stores the final outcome of a claimed event.
    async fn record_outcome(
        &self,
        event_id: &str,
        outcome: WebhookOutcome,
        error_message: Option<String>,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_event_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn WebhookEventRepository) {}
    }

    #[test]
    fn claim_record_starts_processing() {
        let record = WebhookEventRecord::claim(
            "evt_123",
            "checkout.session.completed",
            serde_json::json!({"id": "evt_123"}),
        );

        assert_eq!(record.event_id, "evt_123");
        assert_eq!(record.result, WebhookOutcome::Processing);
        assert!(record.error_message.is_none());
    }

    #[test]
    fn processing_claim_is_reclaimable_only_once_stale() {
        let now = Utc::now();
        let mut record = WebhookEventRecord::claim("evt_1", "x", serde_json::json!({}));

        record.processed_at = now - Duration::minutes(1);
        assert!(!record.is_reclaimable_at(now));

        record.processed_at = now - Duration::seconds(STALE_CLAIM_SECS + 1);
        assert!(record.is_reclaimable_at(now));

        record.result = WebhookOutcome::Success;
        assert!(!record.is_reclaimable_at(now));
    }

    #[test]
    fn outcome_parses_its_own_strings() {
        for outcome in [
            WebhookOutcome::Processing,
            WebhookOutcome::Success,
            WebhookOutcome::Ignored,
            WebhookOutcome::Failed,
        ] {
            assert_eq!(WebhookOutcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(WebhookOutcome::parse("done"), None);
    }
}
