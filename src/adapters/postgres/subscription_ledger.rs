//! PostgreSQL implementation of SubscriptionLedger.
//!
//! Debits and refunds are single conditional `UPDATE ... RETURNING`
//! statements, so the usage check and the increment can never interleave
//! with another request. Replacement runs in one transaction holding the
//! user's row lock.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{
    BillingPeriod, DebitOutcome, NewSubscription, Subscription, SubscriptionStatus,
    SubscriptionTier, UsageCounter,
};
use crate::ports::SubscriptionLedger;

use super::{corrupt, map_sqlx_error};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, tier, monthly_limit, guest_limit, \
     visits_used, guest_passes_used, period_start, period_end, \
     external_subscription_id, external_customer_id, status, created_at, updated_at";

pub struct PostgresSubscriptionLedger {
    pool: PgPool,
}

impl PostgresSubscriptionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    tier: String,
    monthly_limit: i32,
    guest_limit: i32,
    visits_used: i32,
    guest_passes_used: i32,
    period_start: NaiveDate,
    period_end: NaiveDate,
    external_subscription_id: Option<String>,
    external_customer_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let tier: SubscriptionTier = row.tier.parse().map_err(|_| corrupt("tier", &row.tier))?;
        let status: SubscriptionStatus =
            row.status.parse().map_err(|_| corrupt("status", &row.status))?;
        let period = BillingPeriod::new(row.period_start, row.period_end)
            .map_err(|e| DomainError::database(format!("Invalid billing period: {}", e)))?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            tier,
            monthly_limit: row.monthly_limit,
            guest_limit: row.guest_limit,
            visits_used: row.visits_used,
            guest_passes_used: row.guest_passes_used,
            period,
            external_subscription_id: row.external_subscription_id,
            external_customer_id: row.external_customer_id,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn debit_sql(counter: UsageCounter) -> &'static str {
    match counter {
        UsageCounter::Visits => {
            r#"
            UPDATE subscriptions
            SET visits_used = visits_used + 1, updated_at = now()
            WHERE id = $1 AND status = 'active' AND visits_used < monthly_limit
            RETURNING visits_used AS used, monthly_limit AS lim
            "#
        }
        UsageCounter::GuestPasses => {
            r#"
            UPDATE subscriptions
            SET guest_passes_used = guest_passes_used + 1, updated_at = now()
            WHERE id = $1 AND status = 'active' AND guest_passes_used < guest_limit
            RETURNING guest_passes_used AS used, guest_limit AS lim
            "#
        }
    }
}

fn refund_sql(counter: UsageCounter) -> &'static str {
    match counter {
        UsageCounter::Visits => {
            "UPDATE subscriptions SET visits_used = visits_used - 1, updated_at = now() \
             WHERE id = $1 AND visits_used > 0"
        }
        UsageCounter::GuestPasses => {
            "UPDATE subscriptions SET guest_passes_used = guest_passes_used - 1, updated_at = now() \
             WHERE id = $1 AND guest_passes_used > 0"
        }
    }
}

async fn active_for_update(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &UserId,
) -> Result<Option<Subscription>, DomainError> {
    // Serializes concurrent activations for the same user.
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to lock user", e))?;

    let sql = format!(
        "SELECT {} FROM subscriptions WHERE user_id = $1 AND status = 'active' FOR UPDATE",
        SUBSCRIPTION_COLUMNS
    );
    let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
        .bind(user_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to load active subscription", e))?;

    row.map(Subscription::try_from).transpose()
}

#[async_trait]
impl SubscriptionLedger for PostgresSubscriptionLedger {
    async fn current_active(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 AND status = 'active'",
            SUBSCRIPTION_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to load active subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id = $1", SUBSCRIPTION_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn debit(
        &self,
        id: &SubscriptionId,
        counter: UsageCounter,
    ) -> Result<DebitOutcome, DomainError> {
        let row: Option<(i32, i32)> = sqlx::query_as(debit_sql(counter))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to debit subscription", e))?;

        Ok(match row {
            Some((used, limit)) => DebitOutcome::Debited { used, limit },
            None => DebitOutcome::LimitReached,
        })
    }

    async fn refund(&self, id: &SubscriptionId, counter: UsageCounter) -> Result<bool, DomainError> {
        let result = sqlx::query(refund_sql(counter))
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to refund subscription", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_active(&self, fields: NewSubscription) -> Result<Subscription, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        if let Some(current) = active_for_update(&mut tx, &fields.user_id).await? {
            if current.is_same_external_subscription(fields.external_subscription_id.as_deref()) {
                tx.commit()
                    .await
                    .map_err(|e| map_sqlx_error("Failed to commit", e))?;
                return Ok(current);
            }
        }

        sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', updated_at = now()
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(fields.user_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to cancel active subscription", e))?;

        let created = Subscription::activate(fields, Timestamp::now());

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, tier, monthly_limit, guest_limit, visits_used, guest_passes_used,
                period_start, period_end, external_subscription_id, external_customer_id,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(created.id.as_uuid())
        .bind(created.user_id.as_uuid())
        .bind(created.tier.as_str())
        .bind(created.monthly_limit)
        .bind(created.guest_limit)
        .bind(created.visits_used)
        .bind(created.guest_passes_used)
        .bind(created.period.start)
        .bind(created.period.end)
        .bind(&created.external_subscription_id)
        .bind(&created.external_customer_id)
        .bind(created.status.as_str())
        .bind(created.created_at.as_datetime())
        .bind(created.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to insert subscription", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit", e))?;

        Ok(created)
    }

    async fn update_by_external_id(
        &self,
        external_id: &str,
        status: SubscriptionStatus,
        period_end: Option<NaiveDate>,
    ) -> Result<bool, DomainError> {
        // A replaced row is never reactivated while another row is active.
        let result = sqlx::query(
            r#"
            UPDATE subscriptions s
            SET status = CASE
                    WHEN $2 = 'active' AND s.status <> 'active' AND EXISTS (
                        SELECT 1 FROM subscriptions o
                        WHERE o.user_id = s.user_id AND o.status = 'active' AND o.id <> s.id
                    ) THEN s.status
                    ELSE $2
                END,
                period_end = CASE
                    WHEN $3::date IS NOT NULL AND $3::date >= s.period_start THEN $3::date
                    ELSE s.period_end
                END,
                updated_at = now()
            WHERE s.external_subscription_id = $1
            "#,
        )
        .bind(external_id)
        .bind(status.as_str())
        .bind(period_end)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update subscription", e))?;

        Ok(result.rows_affected() > 0)
    }
}
