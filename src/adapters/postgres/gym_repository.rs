//! PostgreSQL implementation of GymRepository.
//!
//! `search` renders a `GymFilter` as one query whose WHERE clause is the
//! conjunction of the predicates that are present.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::foundation::{DomainError, GymId};
use crate::domain::geo::Coordinate;
use crate::domain::gym::{Gym, GymFilter};
use crate::ports::GymRepository;

use super::map_sqlx_error;

const GYM_SELECT: &str =
    "SELECT id, name, address, city, postal_code, chain, latitude, longitude, is_active FROM gyms";

pub struct PostgresGymRepository {
    pool: PgPool,
}

impl PostgresGymRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GymRow {
    id: i64,
    name: String,
    address: String,
    city: Option<String>,
    postal_code: Option<String>,
    chain: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_active: bool,
}

impl From<GymRow> for Gym {
    fn from(row: GymRow) -> Self {
        Gym {
            id: GymId::new(row.id),
            name: row.name,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            chain: row.chain,
            coordinate: Coordinate::from_parts(row.latitude, row.longitude),
            is_active: row.is_active,
        }
    }
}

/// Builds the catalog query for `filter`.
fn search_query(filter: &GymFilter) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(GYM_SELECT);
    builder.push(" WHERE TRUE");

    if let Some(active) = filter.active {
        builder.push(" AND is_active = ");
        builder.push_bind(active);
    }

    if filter.geolocated {
        builder.push(" AND latitude IS NOT NULL AND longitude IS NOT NULL");
    }

    if let Some(chain) = &filter.chain {
        builder.push(" AND chain = ");
        builder.push_bind(chain.as_str());
    }

    if let Some(zip) = &filter.postal_code {
        builder.push(" AND postal_code = ");
        builder.push_bind(zip.as_str());
    }

    if let Some(ids) = &filter.ids {
        let ids: Vec<i64> = ids.iter().map(GymId::value).collect();
        builder.push(" AND id = ANY(");
        builder.push_bind(ids);
        builder.push(")");
    }

    builder.push(" ORDER BY id");

    if let Some(limit) = filter.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit.max(0));
    }

    builder
}

#[async_trait]
impl GymRepository for PostgresGymRepository {
    async fn find_by_id(&self, id: GymId) -> Result<Option<Gym>, DomainError> {
        let sql = format!("{} WHERE id = $1", GYM_SELECT);
        let row: Option<GymRow> = sqlx::query_as(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find gym", e))?;

        Ok(row.map(Gym::from))
    }

    async fn search(&self, filter: &GymFilter) -> Result<Vec<Gym>, DomainError> {
        let mut query = search_query(filter);
        let rows: Vec<GymRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to search gyms", e))?;

        Ok(rows.into_iter().map(Gym::from).collect())
    }
}
