//! Dashboard assembly: resolves the window, pulls incidents from the store,
//! and runs the statistics pass.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::IncidentStore;
use crate::errors::AppError;
use crate::models::incident::{DailyTotal, EnumeratedIncident, Incident};
use crate::services::stats::{
    self, ChartData, MonthOption, PeakDay, TimePeriod, Window,
};

/// Listing order for the incident table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `"asc"` sorts newest first.
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Query parameters accepted by the dashboard endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    pub sort: Option<String>,
}

/// Everything the presentation layer needs for one dashboard render.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub time_period: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub sort: SortOrder,
    pub incidents: Vec<EnumeratedIncident>,
    pub od_count_today: i64,
    pub od_count_since_window_start: i64,
    pub fatalities_since_window_start: i64,
    pub days_elapsed: f64,
    pub average_incidents_per_day: Option<f64>,
    pub average_fatal_incidents_per_day: Option<f64>,
    pub average_time_between_ods: String,
    pub time_between_fatal_incidents: String,
    pub projected_end_of_month_total: i64,
    pub daily_totals: Vec<DailyTotal>,
    pub highest_incident_day: PeakDay,
    pub chart: ChartData,
    pub month_options: Vec<MonthOption>,
    pub year_options: Vec<i32>,
}

/// Dashboard payload; `Empty` is returned before any incident is on file.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardState {
    Empty { month_options: Vec<MonthOption> },
    Ready(Box<Dashboard>),
}

const UNDEFINED: &str = "None";

/// Incidents for the window: every record for all-time, the window range otherwise.
pub async fn fetch_window_incidents<S: IncidentStore>(
    store: &S,
    window: &Window,
) -> Result<Vec<Incident>, AppError> {
    match window.period {
        TimePeriod::AllTime => store.query_all().await,
        _ => store.query_range(window.start, window.end).await,
    }
}

/// Zero-filled daily totals for the window, read fresh from the store.
pub async fn get_incidents_per_day<S: IncidentStore>(
    store: &S,
    window: &Window,
    now: DateTime<Utc>,
) -> Result<Vec<DailyTotal>, AppError> {
    let incidents = fetch_window_incidents(store, window).await?;
    Ok(stats::incidents_per_day(window, &incidents, now))
}

/// People affected today, independent of the selected window.
pub async fn od_count_today<S: IncidentStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<i64, AppError> {
    let today = now.date_naive();
    let start = today.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::microseconds(1);
    let rows = store.query_range(start, end).await?;
    Ok(stats::od_count_on(&rows, today))
}

/// Build the dashboard for `period` as of `now`.
pub async fn build<S: IncidentStore>(
    store: &S,
    period: TimePeriod,
    sort: SortOrder,
    now: DateTime<Utc>,
) -> Result<DashboardState, AppError> {
    let earliest = match store.earliest().await {
        Ok(incident) => incident,
        Err(e) if e.is_not_found() => {
            tracing::debug!("Dashboard requested before any incident was recorded");
            return Ok(DashboardState::Empty {
                month_options: stats::month_options(),
            });
        }
        Err(e) => return Err(e),
    };

    let window = Window::resolve(period, earliest.occurred_at, now)?;
    let incidents = fetch_window_incidents(store, &window).await?;
    let today = od_count_today(store, now).await?;

    let mut enumerated = stats::enumerate_incidents(&incidents);
    if sort == SortOrder::Desc {
        enumerated.reverse();
    }

    let metrics = stats::compute_metrics(&window, &incidents, today, now);
    let daily_totals = stats::incidents_per_day(&window, &incidents, now);
    let highest_incident_day = stats::highest_incident_day(&daily_totals);
    let chart = stats::chart_data(&window, &daily_totals);

    tracing::debug!(
        period = %window.token(),
        incidents = incidents.len(),
        od_count = metrics.od_count_since_window_start,
        "Dashboard computed"
    );

    Ok(DashboardState::Ready(Box::new(Dashboard {
        time_period: window.token(),
        window_start: window.start,
        window_end: window.end,
        sort,
        incidents: enumerated,
        od_count_today: metrics.od_count_today,
        od_count_since_window_start: metrics.od_count_since_window_start,
        fatalities_since_window_start: metrics.fatalities_since_window_start,
        days_elapsed: metrics.days_elapsed,
        average_incidents_per_day: metrics.average_incidents_per_day.map(stats::round5),
        average_fatal_incidents_per_day: metrics
            .average_fatal_incidents_per_day
            .map(stats::round5),
        average_time_between_ods: metrics
            .average_time_between_ods
            .map(|d| d.to_string())
            .unwrap_or_else(|| UNDEFINED.to_string()),
        time_between_fatal_incidents: metrics
            .time_between_fatal_incidents
            .map(|d| d.to_string())
            .unwrap_or_else(|| UNDEFINED.to_string()),
        projected_end_of_month_total: metrics.projected_end_of_month_total,
        daily_totals,
        highest_incident_day,
        chart,
        month_options: stats::month_options(),
        year_options: stats::year_options(earliest.occurred_at.year(), now),
    })))
}
