//! PostgreSQL implementation of WebhookEventRepository.
//!
//! Claims are a single upsert: a new id is inserted as `processing`. An id
//! whose last attempt `failed`, or whose `processing` claim went stale, is
//! flipped back to `processing`. Any other existing row leaves the statement
//! with nothing to return.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::{
    ClaimResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, STALE_CLAIM_SECS,
};

use super::{corrupt, map_sqlx_error};

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
    result: String,
    error_message: Option<String>,
    payload: serde_json::Value,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let result =
            WebhookOutcome::parse(&row.result).ok_or_else(|| corrupt("result", &row.result))?;

        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: row.processed_at,
            result,
            error_message: row.error_message,
            payload: row.payload,
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, processed_at, result, error_message, payload
            FROM webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find webhook event", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn try_claim(&self, record: WebhookEventRecord) -> Result<ClaimResult, DomainError> {
        let claimed: Option<(String,)> = sqlx::query_as(
            r#"
            INSERT INTO webhook_events (event_id, event_type, processed_at, result, error_message, payload)
            VALUES ($1, $2, $3, $4, NULL, $5)
            ON CONFLICT (event_id) DO UPDATE
                SET result = EXCLUDED.result,
                    processed_at = EXCLUDED.processed_at,
                    error_message = NULL
                WHERE webhook_events.result = 'failed'
                   OR (webhook_events.result = 'processing' AND webhook_events.processed_at < $6)
            RETURNING event_id
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.processed_at)
        .bind(WebhookOutcome::Processing.as_str())
        .bind(&record.payload)
        .bind(record.processed_at - Duration::seconds(STALE_CLAIM_SECS))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to claim webhook event", e))?;

        Ok(if claimed.is_some() {
            ClaimResult::Claimed
        } else {
            ClaimResult::AlreadyProcessed
        })
    }

    async fn record_outcome(
        &self,
        event_id: &str,
        outcome: WebhookOutcome,
        error_message: Option<String>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET result = $2, error_message = $3, processed_at = now()
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(outcome.as_str())
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to record webhook outcome", e))?;

        Ok(())
    }
}
