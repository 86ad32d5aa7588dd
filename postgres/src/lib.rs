//! `PostgreSQL` booking store for the booking service.
//!
//! This crate provides [`PostgresBookingStore`], the production implementation of
//! the `BookingStore` trait from `booking-core`. Bookings live in a single table:
//! the recognized domain fields are stored as a `JSONB` object next to a
//! `BIGSERIAL` identifier and the store timestamps.
//!
//! - Schema validation happens before any SQL is issued
//! - Integrity-constraint violations (SQLSTATE class `23`) surface as `ValidationError`
//! - Every other database error is logged and surfaced as a generic `RepositoryError`
//!
//! # Example
//!
//! ```ignore
//! use booking_postgres::PostgresBookingStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresBookingStore::new("postgres://localhost/bookings").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use booking_core::booking::{Booking, BookingData, BookingId};
use booking_core::error::Failure;
use booking_core::schema::BookingSchema;
use booking_core::store::{create_failed, fetch_failed, not_found, update_failed, BookingStore};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;

/// SQLSTATE class for integrity-constraint violations.
const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: i64,
    data: Json<BookingData>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self::new(BookingId::new(row.id), row.data.0, row.created_at, row.updated_at)
    }
}

/// `PostgreSQL`-backed [`BookingStore`].
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
    schema: BookingSchema,
}

impl PostgresBookingStore {
    /// Connect to `database_url` and use the default booking schema.
    ///
    /// # Errors
    ///
    /// Returns the connection error if the pool cannot be created.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Use an existing pool and the default booking schema.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            schema: BookingSchema::default(),
        }
    }

    /// Replace the schema bookings are validated against.
    #[must_use]
    pub fn with_schema(mut self, schema: BookingSchema) -> Self {
        self.schema = schema;
        self
    }

    /// The connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `bookings` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the database error if the DDL fails.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bookings (
                id BIGSERIAL PRIMARY KEY,
                data JSONB NOT NULL CHECK (jsonb_typeof(data) = 'object'),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Bookings table ready");
        Ok(())
    }

    async fn insert(&self, data: BookingData) -> Result<Booking, Failure> {
        let fields = self.schema.validate(&data)?;

        let row: BookingRow = sqlx::query_as(
            r"
            INSERT INTO bookings (data)
            VALUES ($1)
            RETURNING id, data, created_at, updated_at
            ",
        )
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(&e, "create", create_failed))?;

        tracing::debug!(booking_id = row.id, "Booking stored");
        Ok(row.into())
    }

    async fn apply_update(&self, id: BookingId, patch: BookingData) -> Result<Booking, Failure> {
        self.schema.validate_partial(&patch)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| translate(&e, "update", update_failed))?;

        let current: Option<BookingRow> = sqlx::query_as(
            r"
            SELECT id, data, created_at, updated_at
            FROM bookings
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| translate(&e, "update", update_failed))?;

        let current = Booking::from(current.ok_or_else(|| not_found(id))?);
        let fields = self.schema.validate(&current.merged_fields(&patch))?;

        let row: BookingRow = sqlx::query_as(
            r"
            UPDATE bookings
            SET data = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, data, created_at, updated_at
            ",
        )
        .bind(Json(&fields))
        .bind(id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| translate(&e, "update", update_failed))?;

        tx.commit()
            .await
            .map_err(|e| translate(&e, "update", update_failed))?;

        tracing::debug!(booking_id = row.id, "Booking updated");
        Ok(row.into())
    }

    async fn select(&self, id: BookingId) -> Result<Option<Booking>, Failure> {
        let row: Option<BookingRow> = sqlx::query_as(
            r"
            SELECT id, data, created_at, updated_at
            FROM bookings
            WHERE id = $1
            ",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate(&e, "find", fetch_failed))?;

        Ok(row.map(Booking::from))
    }
}

impl BookingStore for PostgresBookingStore {
    fn create(
        &self,
        data: BookingData,
    ) -> Pin<Box<dyn Future<Output = Result<Booking, Failure>> + Send + '_>> {
        Box::pin(self.insert(data))
    }

    fn update(
        &self,
        id: BookingId,
        data: BookingData,
    ) -> Pin<Box<dyn Future<Output = Result<Booking, Failure>> + Send + '_>> {
        Box::pin(self.apply_update(id, data))
    }

    fn find(
        &self,
        id: BookingId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Booking>, Failure>> + Send + '_>> {
        Box::pin(self.select(id))
    }
}

/// Map a database error onto the failure taxonomy.
///
/// The raw error is logged here and never surfaced to the caller.
fn translate(err: &sqlx::Error, operation: &'static str, fallback: fn() -> Failure) -> Failure {
    if let sqlx::Error::Database(db) = err {
        if db
            .code()
            .is_some_and(|code| code.starts_with(INTEGRITY_CONSTRAINT_CLASS))
        {
            tracing::warn!(operation, error = %db, "Database rejected booking");
            let detail = db.constraint().map_or_else(
                || "Booking violates a database constraint".to_string(),
                |constraint| format!("Booking violates the {constraint} constraint"),
            );
            return Failure::validation(detail);
        }
    }

    tracing::error!(operation, error = %err, "Booking store operation failed");
    fallback()
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::error::FailureKind;
    use http::StatusCode;

    #[test]
    fn connection_errors_become_repository_failures() {
        let failure = translate(&sqlx::Error::PoolTimedOut, "create", create_failed);
        assert_eq!(failure.kind(), FailureKind::Repository);
        assert_eq!(failure.message(), "Cannot create booking");
        assert_eq!(failure.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!failure.explanation().contains("pool"));
    }

    #[test]
    fn fallback_follows_operation() {
        let failure = translate(&sqlx::Error::RowNotFound, "update", update_failed);
        assert_eq!(failure.message(), "Cannot update booking");
    }
}
