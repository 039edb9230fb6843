//! In-memory incident store with the same uniqueness rules as the database.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_timestamp, no_incidents, IncidentStore};
use crate::errors::AppError;
use crate::models::incident::{CreateIncident, Incident};

/// Incident records kept sorted by timestamp.
#[derive(Debug, Default)]
pub struct MemoryStore {
    incidents: RwLock<Vec<Incident>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncidentStore for MemoryStore {
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Incident>, AppError> {
        let incidents = self.incidents.read().await;
        Ok(incidents
            .iter()
            .filter(|i| i.occurred_at >= start && i.occurred_at <= end)
            .cloned()
            .collect())
    }

    async fn query_all(&self) -> Result<Vec<Incident>, AppError> {
        Ok(self.incidents.read().await.clone())
    }

    async fn earliest(&self) -> Result<Incident, AppError> {
        self.incidents
            .read()
            .await
            .first()
            .cloned()
            .ok_or_else(no_incidents)
    }

    async fn insert(&self, input: &CreateIncident) -> Result<Incident, AppError> {
        let mut incidents = self.incidents.write().await;
        let pos = match incidents.binary_search_by_key(&input.occurred_at, |i| i.occurred_at) {
            Ok(_) => return Err(duplicate_timestamp(input.occurred_at)),
            Err(pos) => pos,
        };

        let incident = Incident {
            id: Uuid::now_v7(),
            occurred_at: input.occurred_at,
            location: input.location.clone(),
            number_affected: input.number_affected,
            narcan_doses_administered: input.narcan_doses_administered,
            report_text: input.report_text.clone(),
            fatal_incident: input.fatal_incident,
            coordinates: input.coordinates.clone(),
            created_at: Utc::now(),
        };
        incidents.insert(pos, incident.clone());
        Ok(incident)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Incident, AppError> {
        self.incidents
            .read()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Incident not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(day: u32, hour: u32) -> CreateIncident {
        CreateIncident {
            occurred_at: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            location: format!("Block {day}"),
            number_affected: 1,
            narcan_doses_administered: None,
            report_text: String::new(),
            fatal_incident: false,
            coordinates: None,
        }
    }

    #[tokio::test]
    async fn earliest_on_empty_store_is_not_found() {
        let store = MemoryStore::new();
        let err = store.earliest().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn insert_keeps_timestamp_order() {
        let store = MemoryStore::new();
        store.insert(&input(3, 9)).await.unwrap();
        store.insert(&input(1, 9)).await.unwrap();
        store.insert(&input(2, 9)).await.unwrap();

        let all = store.query_all().await.unwrap();
        let days: Vec<_> = all.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(days, vec!["Block 1", "Block 2", "Block 3"]);
        assert_eq!(store.earliest().await.unwrap().location, "Block 1");
    }

    #[tokio::test]
    async fn duplicate_timestamp_rejected_without_mutation() {
        let store = MemoryStore::new();
        store.insert(&input(1, 9)).await.unwrap();

        let mut dup = input(1, 9);
        dup.location = "Elsewhere".to_string();
        let err = store.insert(&dup).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(_)));

        let all = store.query_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].location, "Block 1");
    }

    #[tokio::test]
    async fn query_range_is_inclusive() {
        let store = MemoryStore::new();
        for day in 1..=4 {
            store.insert(&input(day, 0)).await.unwrap();
        }
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        let rows = store.query_range(start, end).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn find_by_id_round_trip() {
        let store = MemoryStore::new();
        let created = store.insert(&input(5, 12)).await.unwrap();
        assert_eq!(store.find_by_id(created.id).await.unwrap(), created);
        assert!(store.find_by_id(Uuid::nil()).await.unwrap_err().is_not_found());
    }
}
