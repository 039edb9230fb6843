//! Database connection pool and the incident store contract.

pub mod memory;
pub mod postgres;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::incident::{CreateIncident, Incident};

pub use memory::MemoryStore;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Persistence for incident records.
///
/// All listing operations return records in ascending timestamp order.
#[allow(async_fn_in_trait)]
pub trait IncidentStore {
    /// Records whose timestamp lies in `[start, end]`, both bounds inclusive.
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Incident>, AppError>;

    async fn query_all(&self) -> Result<Vec<Incident>, AppError>;

    /// The oldest record on file, or `AppError::NotFound` when the store is empty.
    async fn earliest(&self) -> Result<Incident, AppError>;

    /// Persist a new record. A timestamp collision fails with `AppError::DuplicateKey`
    /// and leaves the store untouched.
    async fn insert(&self, input: &CreateIncident) -> Result<Incident, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Incident, AppError>;
}

pub(crate) fn no_incidents() -> AppError {
    AppError::NotFound("No incidents have been recorded yet".to_string())
}

pub(crate) fn duplicate_timestamp(occurred_at: DateTime<Utc>) -> AppError {
    AppError::DuplicateKey(format!(
        "An incident is already recorded at {}",
        occurred_at.to_rfc3339()
    ))
}
