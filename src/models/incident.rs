//! Overdose incident model, input DTOs, and derived per-window values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One reported overdose event as persisted by the incident store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Incident {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub location: String,
    pub number_affected: i32,
    pub narcan_doses_administered: Option<i32>,
    pub report_text: String,
    pub fatal_incident: bool,
    pub coordinates: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for reporting a new incident.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIncident {
    pub occurred_at: DateTime<Utc>,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    #[validate(range(min = 1))]
    pub number_affected: i32,
    #[validate(range(min = 0))]
    pub narcan_doses_administered: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub report_text: String,
    pub fatal_incident: bool,
    #[validate(length(max = 50))]
    pub coordinates: Option<String>,
}

/// An incident paired with its ordinal label inside the current window.
///
/// Built fresh from query results; the underlying record is never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct EnumeratedIncident {
    #[serde(flatten)]
    pub incident: Incident,
    pub ordinal_label: String,
}

/// Sum of people affected on one calendar date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: i64,
}
