//! Incident routes: reporting, lookup, and CSV import/export.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::db::IncidentStore;
use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::incident::{CreateIncident, Incident};
use crate::services::incident::{self as incident_service, ImportResult};
use crate::AppState;

/// POST /api/v1/incidents — report a new incident.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateIncident>,
) -> Result<Json<ApiResponse<Incident>>, AppError> {
    tracing::debug!(reporter = %current_user.username, "Incident submitted");
    let incident = incident_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(incident))
}

/// GET /api/v1/incidents/{id} — fetch one incident.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Incident>>, AppError> {
    let incident = state.db.find_by_id(id).await?;
    Ok(ApiResponse::success(incident))
}

/// GET /api/v1/incidents/export — all incidents as CSV.
pub async fn export(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let body = incident_service::export_csv(&state.db).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"incidents.csv\"",
            ),
        ],
        body,
    ))
}

/// POST /api/v1/incidents/import — bulk import from a CSV request body.
pub async fn import(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: Bytes,
) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    tracing::info!(reporter = %current_user.username, bytes = body.len(), "Incident CSV import started");
    let result = incident_service::import_csv(&state.db, &body).await?;
    Ok(ApiResponse::success(result))
}
