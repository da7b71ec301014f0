// Trip history: append-only log of planned trips, PostgreSQL backed.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::models::HistoryEntry;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid history data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// One stored trip request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRecord {
    pub id: i32,
    pub origin: String,
    pub destination: String,
    pub vehicle: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn to_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            origem: self.origin.clone(),
            destino: self.destination.clone(),
            veiculo: self.vehicle.clone(),
            data: self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub origin: String,
    pub destination: String,
    pub vehicle: String,
}

/// Append-only trip log: records are inserted and listed, never updated or deleted.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record(&self, trip: NewHistoryRecord) -> Result<HistoryRecord, DatabaseError>;

    /// Most recent trips first, at most `limit` of them.
    async fn list(&self, limit: i64) -> Result<Vec<HistoryRecord>, DatabaseError>;
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL.
    ///
    /// # Errors
    /// Returns `ConfigError` when no URL is configured and `ConnectionError`
    /// when the server cannot be reached.
    pub async fn new(database_url: Option<&str>) -> Result<Self, DatabaseError> {
        let database_url = database_url.filter(|url| !url.trim().is_empty()).ok_or_else(|| {
            DatabaseError::ConfigError("DATABASE_URL environment variable not set".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let migration_sql = include_str!("../migrations/20261016_create_trip_history.sql");

        // raw_sql accepts several statements in one call
        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for Database {
    async fn record(&self, trip: NewHistoryRecord) -> Result<HistoryRecord, DatabaseError> {
        if trip.origin.trim().is_empty() || trip.destination.trim().is_empty() {
            return Err(DatabaseError::InvalidData(
                "origin and destination must not be empty".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, HistoryRecord>(
            r#"
            INSERT INTO trip_history (origin, destination, vehicle)
            VALUES ($1, $2, $3)
            RETURNING id, origin, destination, vehicle, created_at
            "#,
        )
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(&trip.vehicle)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Trip recorded: {} -> {} (ID: {})",
            record.origin,
            record.destination,
            record.id
        );
        Ok(record)
    }

    async fn list(&self, limit: i64) -> Result<Vec<HistoryRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT id, origin, destination, vehicle, created_at
            FROM trip_history
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Retrieved {} history records", records.len());
        Ok(records)
    }
}
