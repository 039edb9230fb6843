//! Dashboard routes: incident statistics for a selected time window.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::services::dashboard::{self, DashboardQuery, DashboardState, SortOrder};
use crate::services::stats::TimePeriod;
use crate::AppState;

async fn render(
    state: &AppState,
    period: Option<&str>,
    sort: Option<&str>,
) -> Result<Json<ApiResponse<DashboardState>>, AppError> {
    let period = TimePeriod::parse(period)?;
    let sort = SortOrder::parse(sort);
    let result = dashboard::build(&state.db, period, sort, Utc::now()).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/dashboard?period=&sort= — statistics for the current month by default.
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardState>>, AppError> {
    render(&state, query.period.as_deref(), query.sort.as_deref()).await
}

/// GET /api/v1/dashboard/{period}?sort= — statistics for `all_time` or a `YYYY-MM` month.
pub async fn show_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardState>>, AppError> {
    render(&state, Some(period.as_str()), query.sort.as_deref()).await
}
