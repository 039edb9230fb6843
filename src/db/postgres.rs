//! PostgreSQL-backed incident store.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{duplicate_timestamp, no_incidents, IncidentStore};
use crate::errors::AppError;
use crate::models::incident::{CreateIncident, Incident};

impl IncidentStore for PgPool {
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Incident>, AppError> {
        let rows = sqlx::query_as::<_, Incident>(
            r#"
            SELECT * FROM incidents
            WHERE occurred_at >= $1 AND occurred_at <= $2
            ORDER BY occurred_at ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn query_all(&self) -> Result<Vec<Incident>, AppError> {
        let rows = sqlx::query_as::<_, Incident>("SELECT * FROM incidents ORDER BY occurred_at ASC")
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn earliest(&self) -> Result<Incident, AppError> {
        sqlx::query_as::<_, Incident>("SELECT * FROM incidents ORDER BY occurred_at ASC LIMIT 1")
            .fetch_optional(self)
            .await?
            .ok_or_else(no_incidents)
    }

    async fn insert(&self, input: &CreateIncident) -> Result<Incident, AppError> {
        let incident = sqlx::query_as::<_, Incident>(
            r#"
            INSERT INTO incidents (occurred_at, location, number_affected,
                narcan_doses_administered, report_text, fatal_incident, coordinates)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.occurred_at)
        .bind(&input.location)
        .bind(input.number_affected)
        .bind(input.narcan_doses_administered)
        .bind(&input.report_text)
        .bind(input.fatal_incident)
        .bind(&input.coordinates)
        .fetch_one(self)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                duplicate_timestamp(input.occurred_at)
            }
            _ => AppError::Database(e),
        })?;

        Ok(incident)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Incident, AppError> {
        sqlx::query_as::<_, Incident>("SELECT * FROM incidents WHERE id = $1")
            .bind(id)
            .fetch_optional(self)
            .await?
            .ok_or_else(|| AppError::NotFound("Incident not found".to_string()))
    }
}
