//! Incident service: validated reporting, CSV export, and bulk CSV import.

use serde::Serialize;
use validator::Validate;

use crate::db::IncidentStore;
use crate::errors::AppError;
use crate::models::incident::{CreateIncident, Incident};

/// Result of a bulk import operation.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub total: usize,
    pub created: usize,
    pub duplicates: usize,
    pub errors: Vec<ImportError>,
}

/// Individual import error. `row` is 1-based and excludes the header.
#[derive(Debug, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub message: String,
}

/// Validate and store a new incident report.
pub async fn create<S: IncidentStore>(
    store: &S,
    input: &CreateIncident,
) -> Result<Incident, AppError> {
    input.validate()?;

    match store.insert(input).await {
        Ok(incident) => {
            tracing::info!(
                incident_id = %incident.id,
                location = %incident.location,
                number_affected = incident.number_affected,
                "Incident recorded"
            );
            Ok(incident)
        }
        Err(e @ AppError::DuplicateKey(_)) => {
            tracing::warn!(occurred_at = %input.occurred_at, "Rejected duplicate incident timestamp");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Serialize every incident, oldest first, as CSV with a header row.
pub async fn export_csv<S: IncidentStore>(store: &S) -> Result<String, AppError> {
    let incidents = store.query_all().await?;
    let mut writer = csv::Writer::from_writer(Vec::new());
    for incident in &incidents {
        writer
            .serialize(incident)
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding failed: {e}")))
}

/// Import incidents from CSV. Columns match [`CreateIncident`]; extra columns
/// such as `id` from an export are ignored. Bad rows are reported, not fatal.
pub async fn import_csv<S: IncidentStore>(store: &S, data: &[u8]) -> Result<ImportResult, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Invalid CSV headers: {e}")))?;

    let mut total = 0usize;
    let mut created = 0usize;
    let mut duplicates = 0usize;
    let mut errors = Vec::new();

    for (i, result) in reader.deserialize::<CreateIncident>().enumerate() {
        total += 1;
        let row = i + 1;

        let input = match result {
            Ok(input) => input,
            Err(e) => {
                errors.push(ImportError {
                    row,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match create(store, &input).await {
            Ok(_) => created += 1,
            Err(AppError::DuplicateKey(msg)) => {
                duplicates += 1;
                errors.push(ImportError { row, message: msg });
            }
            Err(AppError::Validation(msg)) => errors.push(ImportError { row, message: msg }),
            Err(e) => return Err(e),
        }
    }

    tracing::info!(total, created, duplicates, errors = errors.len(), "Incident CSV import finished");

    Ok(ImportResult {
        total,
        created,
        duplicates,
        errors,
    })
}
