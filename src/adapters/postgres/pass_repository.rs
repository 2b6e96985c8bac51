//! PostgreSQL implementation of PassRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::pass::GymPass;
use crate::ports::PassRepository;

use super::map_sqlx_error;

pub struct PostgresPassRepository {
    pool: PgPool,
}

impl PostgresPassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PassRepository for PostgresPassRepository {
    async fn insert(&self, pass: &GymPass) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO gym_passes (
                id, user_id, subscription_id, gym_id, code, kind, status,
                issued_at, valid_until, tier, price_cents, currency
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(pass.id.as_uuid())
        .bind(pass.user_id.as_uuid())
        .bind(pass.subscription_id.as_uuid())
        .bind(pass.gym_id.value())
        .bind(pass.code.as_str())
        .bind(pass.kind.as_str())
        .bind(pass.status.as_str())
        .bind(pass.issued_at.as_datetime())
        .bind(pass.valid_until.as_datetime())
        .bind(pass.tier.as_str())
        .bind(pass.price.amount_cents)
        .bind(&pass.price.currency)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to insert pass", e))?;

        Ok(())
    }
}
