//! Ride repository for database operations.

use domain::models::Ride;
use domain::services::{RideFilter, RideStore, StoreError};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RideEntity;
use crate::metrics::QueryTimer;

const RIDE_COLUMNS: &str = r#"
    id, creator_id, name, contact, pickup, destination,
    pickup_lat, pickup_lng, destination_lat, destination_lng,
    datetime, seats_available, notes, is_full,
    pending_join_requests, joined_users, version, created_at, updated_at
"#;

/// Escapes `%`, `_` and `\` so the text matches literally inside ILIKE.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Ride store query failed");
    StoreError::Backend(err.to_string())
}

/// Repository for ride database operations.
#[derive(Clone)]
pub struct RideRepository {
    pool: PgPool,
}

impl RideRepository {
    /// Creates a new RideRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RideStore for RideRepository {
    async fn insert(&self, ride: &Ride) -> Result<(), StoreError> {
        let timer = QueryTimer::new("insert_ride");
        let result = sqlx::query(
            r#"
            INSERT INTO rides (
                id, creator_id, name, contact, pickup, destination,
                pickup_lat, pickup_lng, destination_lat, destination_lng,
                datetime, seats_available, notes, is_full,
                pending_join_requests, joined_users, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(ride.id)
        .bind(&ride.creator_id)
        .bind(&ride.name)
        .bind(&ride.contact)
        .bind(&ride.pickup)
        .bind(&ride.destination)
        .bind(ride.pickup_coords.map(|c| c.lat))
        .bind(ride.pickup_coords.map(|c| c.lng))
        .bind(ride.destination_coords.map(|c| c.lat))
        .bind(ride.destination_coords.map(|c| c.lng))
        .bind(ride.datetime)
        .bind(ride.seats_available)
        .bind(&ride.notes)
        .bind(ride.is_full)
        .bind(Json(&ride.pending_join_requests))
        .bind(Json(&ride.joined_users))
        .bind(ride.version)
        .bind(ride.created_at)
        .bind(ride.updated_at)
        .execute(&self.pool)
        .await;
        timer.finish(&result);

        result.map(|_| ()).map_err(backend)
    }

    async fn find(&self, filter: &RideFilter) -> Result<Vec<Ride>, StoreError> {
        let timer = QueryTimer::new("find_rides");
        let sql = format!(
            r#"
            SELECT {RIDE_COLUMNS}
            FROM rides
            WHERE ($1::text IS NULL OR creator_id = $1)
              AND ($2::text IS NULL OR pickup ILIKE '%' || $2 || '%' ESCAPE '\')
              AND ($3::text IS NULL OR destination ILIKE '%' || $3 || '%' ESCAPE '\')
              AND (NOT $4 OR is_full = FALSE)
            ORDER BY created_at DESC, id DESC
            "#
        );
        let result = sqlx::query_as::<_, RideEntity>(&sql)
            .bind(&filter.creator_id)
            .bind(filter.pickup_contains.as_deref().map(escape_like))
            .bind(filter.destination_contains.as_deref().map(escape_like))
            .bind(filter.exclude_full)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);

        let entities = result.map_err(backend)?;
        Ok(entities.into_iter().map(RideEntity::into_domain).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, StoreError> {
        let timer = QueryTimer::new("find_ride_by_id");
        let sql = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1");
        let result = sqlx::query_as::<_, RideEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(&result);

        Ok(result.map_err(backend)?.map(RideEntity::into_domain))
    }

    async fn save(&self, ride: &Ride) -> Result<Ride, StoreError> {
        let timer = QueryTimer::new("save_ride");
        let sql = format!(
            r#"
            UPDATE rides SET
                seats_available = $3,
                is_full = $4,
                pending_join_requests = $5,
                joined_users = $6,
                updated_at = $7,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {RIDE_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, RideEntity>(&sql)
            .bind(ride.id)
            .bind(ride.version)
            .bind(ride.seats_available)
            .bind(ride.is_full)
            .bind(Json(&ride.pending_join_requests))
            .bind(Json(&ride.joined_users))
            .bind(ride.updated_at)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(&result);

        match result.map_err(backend)? {
            Some(entity) => Ok(entity.into_domain()),
            None => {
                tracing::warn!(ride_id = %ride.id, version = ride.version, "Stale ride write rejected");
                Err(StoreError::Conflict)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("delete_ride");
        let result = sqlx::query("DELETE FROM rides WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);

        Ok(result.map_err(backend)?.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let timer = QueryTimer::new("ping");
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        timer.finish(&result);

        result.map(|_| ()).map_err(backend)
    }
}
