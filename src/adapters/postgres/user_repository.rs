//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ExternalIdentity, Timestamp, UserId};
use crate::domain::user::{NewUser, User};
use crate::ports::UserRepository;

use super::{corrupt, map_sqlx_error};

const USER_COLUMNS: &str =
    "id, external_id, email, display_name, postal_code, billing_customer_id, created_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, predicate);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find user", e))?;

        row.map(User::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    external_id: String,
    email: Option<String>,
    display_name: Option<String>,
    postal_code: Option<String>,
    billing_customer_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let external_id = ExternalIdentity::new(row.external_id.as_str())
            .map_err(|_| corrupt("external_id", &row.external_id))?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            external_id,
            email: row.email,
            display_name: row.display_name,
            postal_code: row.postal_code,
            billing_customer_id: row.billing_customer_id,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalIdentity,
    ) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("external_id", external_id.as_str()).await
    }

    async fn find_by_billing_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("billing_customer_id", customer_id).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, DomainError> {
        let user = user.into_user(Timestamp::now());

        sqlx::query(
            r#"
            INSERT INTO users (id, external_id, email, display_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.external_id.as_str())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to insert user", e))?;

        Ok(user)
    }

    async fn set_billing_customer(
        &self,
        id: &UserId,
        customer_id: &str,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET billing_customer_id = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to store billing customer", e))?;
        Ok(())
    }

    async fn set_postal_code(&self, id: &UserId, postal_code: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET postal_code = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(postal_code)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to store postal code", e))?;
        Ok(())
    }
}
