//! In-memory processed-event ledger.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::DomainError;
use crate::ports::{ClaimResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome};

use super::lock;

#[derive(Default)]
pub struct InMemoryWebhookEventRepository {
    records: Mutex<HashMap<String, WebhookEventRecord>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(lock(&self.records)?.get(event_id).cloned())
    }

    async fn try_claim(&self, record: WebhookEventRecord) -> Result<ClaimResult, DomainError> {
        let mut records = lock(&self.records)?;
        match records.get_mut(&record.event_id) {
            Some(existing) if existing.is_reclaimable_at(record.processed_at) => {
                existing.result = WebhookOutcome::Processing;
                existing.error_message = None;
                existing.processed_at = record.processed_at;
                Ok(ClaimResult::Claimed)
            }
            Some(_) => Ok(ClaimResult::AlreadyProcessed),
            None => {
                records.insert(record.event_id.clone(), record);
                Ok(ClaimResult::Claimed)
            }
        }
    }

    async fn record_outcome(
        &self,
        event_id: &str,
        outcome: WebhookOutcome,
        error_message: Option<String>,
    ) -> Result<(), DomainError> {
        if let Some(record) = lock(&self.records)?.get_mut(event_id) {
            record.result = outcome;
            record.error_message = error_message;
            record.processed_at = Utc::now();
        }
        Ok(())
    }
}
