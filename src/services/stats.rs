//! Incident statistics over a resolved time window.
//!
//! Everything here is a pure function of the incident rows, the window bounds
//! and a single `now` instant captured by the caller. Store access lives in
//! [`crate::services::dashboard`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::incident::{DailyTotal, EnumeratedIncident, Incident};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Series longer than this only label every Nth tick.
pub const TICK_LABEL_STRIDE: usize = 31;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Convert a duration to fractional days, keeping sub-second precision.
pub fn fractional_days(delta: TimeDelta) -> f64 {
    let seconds = match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_seconds() as f64,
    };
    seconds / SECONDS_PER_DAY
}

/// Round a rate to five decimal places for display.
pub fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

// -- Window resolution --

/// Requested time period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    CurrentMonth,
    Month { year: i32, month: u32 },
    AllTime,
}

impl TimePeriod {
    /// Parse `"all_time"`, a `"YYYY-MM"` token, or nothing (current month).
    pub fn parse(token: Option<&str>) -> Result<Self, AppError> {
        let token = match token.map(str::trim) {
            None | Some("") => return Ok(Self::CurrentMonth),
            Some("all_time") => return Ok(Self::AllTime),
            Some(t) => t,
        };

        static MONTH_TOKEN: OnceLock<Regex> = OnceLock::new();
        let re = MONTH_TOKEN.get_or_init(|| {
            Regex::new(r"^(?P<year>\d{4})-(?P<month>\d{2})$").expect("static pattern")
        });

        let invalid = || AppError::Validation(format!("Invalid time period '{token}', expected YYYY-MM"));
        let caps = re.captures(token).ok_or_else(invalid)?;
        let year: i32 = caps["year"].parse().map_err(|_| invalid())?;
        let month: u32 = caps["month"].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self::Month { year, month })
    }
}

/// Resolved window bounds. `period` is never `CurrentMonth` once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub period: TimePeriod,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Resolve a period into concrete bounds.
    ///
    /// Month windows span midnight of the 1st through the last microsecond of
    /// the month. The all-time window starts at midnight of the earliest
    /// record's date and ends at `now`.
    pub fn resolve(
        period: TimePeriod,
        earliest: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        match period {
            TimePeriod::CurrentMonth => Self::month(now.year(), now.month()),
            TimePeriod::Month { year, month } => Self::month(year, month),
            TimePeriod::AllTime => Ok(Self {
                period,
                start: start_of_day(earliest.date_naive()),
                end: now,
            }),
        }
    }

    fn month(year: i32, month: u32) -> Result<Self, AppError> {
        let out_of_range = || AppError::Validation(format!("Month {year}-{month:02} is out of range"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(out_of_range)?;

        Ok(Self {
            period: TimePeriod::Month { year, month },
            start: start_of_day(first),
            end: start_of_day(next_first) - Duration::microseconds(1),
        })
    }

    /// End of the range counted toward window totals.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.period {
            TimePeriod::AllTime => now,
            _ => self.end,
        }
    }

    /// Token that selects this window again (`"all_time"` or `"YYYY-MM"`).
    pub fn token(&self) -> String {
        match self.period {
            TimePeriod::AllTime => "all_time".to_string(),
            _ => format!("{:04}-{:02}", self.start.year(), self.start.month()),
        }
    }

    fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.effective_end(now)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// -- Incident enumeration --

/// Ordinal labels for incidents sorted ascending by timestamp.
///
/// The counter restarts at 1 whenever the calendar month changes and advances
/// by `number_affected` per record; multi-person events get a `"a - b"` range.
pub fn ordinal_labels(incidents: &[Incident]) -> Vec<String> {
    let mut counter: i64 = 1;
    let mut current_month: Option<(i32, u32)> = None;

    incidents
        .iter()
        .map(|incident| {
            let month = (incident.occurred_at.year(), incident.occurred_at.month());
            match current_month {
                Some(m) if m != month => {
                    counter = 1;
                    current_month = Some(month);
                }
                None => current_month = Some(month),
                _ => {}
            }

            let affected = i64::from(incident.number_affected);
            let label = if affected == 1 {
                counter.to_string()
            } else {
                format!("{} - {}", counter, counter + affected - 1)
            };
            counter += affected;
            label
        })
        .collect()
}

/// Pair each incident with its ordinal label, preserving input order.
pub fn enumerate_incidents(incidents: &[Incident]) -> Vec<EnumeratedIncident> {
    incidents
        .iter()
        .cloned()
        .zip(ordinal_labels(incidents))
        .map(|(incident, ordinal_label)| EnumeratedIncident {
            incident,
            ordinal_label,
        })
        .collect()
}

// -- Daily totals --

/// Zero-filled per-day totals from the window's first day through
/// `min(now, window.end)`'s day, inclusive.
pub fn incidents_per_day(
    window: &Window,
    incidents: &[Incident],
    now: DateTime<Utc>,
) -> Vec<DailyTotal> {
    let mut grouped: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for incident in incidents
        .iter()
        .filter(|i| i.occurred_at >= window.start && i.occurred_at <= window.end)
    {
        *grouped.entry(incident.occurred_at.date_naive()).or_insert(0) +=
            i64::from(incident.number_affected);
    }

    let first = window.start.date_naive();
    let last = now.min(window.end).date_naive();

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DailyTotal {
            date,
            total: grouped.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Day with the largest total.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PeakDay {
    pub date: Option<NaiveDate>,
    pub total: i64,
}

/// Linear scan with strict `>`, so the earliest date wins ties.
/// An empty or all-zero series yields no date and a total of 0.
pub fn highest_incident_day(daily: &[DailyTotal]) -> PeakDay {
    let mut peak = PeakDay {
        date: None,
        total: 0,
    };
    for day in daily {
        if day.total > peak.total {
            peak = PeakDay {
                date: Some(day.date),
                total: day.total,
            };
        }
    }
    peak
}

// -- Aggregate metrics --

/// Whole hours and minutes, each floored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HoursMinutes {
    pub hours: i64,
    pub minutes: i64,
}

impl HoursMinutes {
    pub fn from_hours(hours: f64) -> Self {
        let whole = hours.floor();
        Self {
            hours: whole as i64,
            minutes: ((hours - whole) * 60.0).floor() as i64,
        }
    }
}

impl fmt::Display for HoursMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hours, {} minutes", self.hours, self.minutes)
    }
}

/// Whole days, hours and minutes via repeated floor-and-remainder.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DaysHoursMinutes {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl DaysHoursMinutes {
    pub fn from_days(days: f64) -> Self {
        let whole_days = days.floor();
        let hours = (days - whole_days) * 24.0;
        let whole_hours = hours.floor();
        Self {
            days: whole_days as i64,
            hours: whole_hours as i64,
            minutes: ((hours - whole_hours) * 60.0).floor() as i64,
        }
    }
}

impl fmt::Display for DaysHoursMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} days, {} hours, {} minutes",
            self.days, self.hours, self.minutes
        )
    }
}

/// Derived metrics for one window.
///
/// `None` marks a value that is undefined because its denominator is zero.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WindowMetrics {
    pub od_count_today: i64,
    pub od_count_since_window_start: i64,
    pub fatalities_since_window_start: i64,
    pub days_elapsed: f64,
    pub average_incidents_per_day: Option<f64>,
    pub average_fatal_incidents_per_day: Option<f64>,
    pub average_time_between_ods: Option<HoursMinutes>,
    pub time_between_fatal_incidents: Option<DaysHoursMinutes>,
    pub projected_end_of_month_total: i64,
}

/// Sum of `number_affected` for incidents on `date`.
pub fn od_count_on(incidents: &[Incident], date: NaiveDate) -> i64 {
    incidents
        .iter()
        .filter(|i| i.occurred_at.date_naive() == date)
        .map(|i| i64::from(i.number_affected))
        .sum()
}

/// Compute window metrics.
///
/// The overall rate is driven by people affected while the fatal rate counts
/// fatal incidents, matching how each figure is reported on the dashboard.
pub fn compute_metrics(
    window: &Window,
    incidents: &[Incident],
    od_count_today: i64,
    now: DateTime<Utc>,
) -> WindowMetrics {
    let in_window: Vec<&Incident> = incidents
        .iter()
        .filter(|i| window.contains(i.occurred_at, now))
        .collect();

    let od_count: i64 = in_window.iter().map(|i| i64::from(i.number_affected)).sum();
    let fatalities = in_window.iter().filter(|i| i.fatal_incident).count() as i64;
    let days_elapsed = fractional_days(window.effective_end(now) - window.start);

    let (average, average_fatal) = if days_elapsed == 0.0 {
        (None, None)
    } else {
        (
            Some(od_count as f64 / days_elapsed),
            Some(fatalities as f64 / days_elapsed),
        )
    };

    let average_time_between_ods = (od_count != 0)
        .then(|| HoursMinutes::from_hours(days_elapsed / od_count as f64 * 24.0));

    let time_between_fatal_incidents = average_fatal
        .filter(|rate| *rate != 0.0)
        .map(|rate| DaysHoursMinutes::from_days(1.0 / rate));

    WindowMetrics {
        od_count_today,
        od_count_since_window_start: od_count,
        fatalities_since_window_start: fatalities,
        days_elapsed,
        average_incidents_per_day: average,
        average_fatal_incidents_per_day: average_fatal,
        average_time_between_ods,
        time_between_fatal_incidents,
        projected_end_of_month_total: projected_total(window, od_count, average, now),
    }
}

/// Window total extrapolated to `window.end` at the current average rate.
/// Windows that have already closed report their actual total.
pub fn projected_total(
    window: &Window,
    od_count: i64,
    average_per_day: Option<f64>,
    now: DateTime<Utc>,
) -> i64 {
    if window.end <= now {
        return od_count;
    }
    match average_per_day {
        Some(rate) => {
            let additional = fractional_days(window.end - now) * rate;
            (od_count as f64 + additional).floor() as i64
        }
        None => od_count,
    }
}

// -- Chart data --

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartTick {
    pub index: usize,
    pub label: String,
}

/// Bar chart series; rendering is left to the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartData {
    pub title: String,
    pub points: Vec<DailyTotal>,
    pub ticks: Vec<ChartTick>,
}

pub fn chart_title(window: &Window) -> String {
    match window.period {
        TimePeriod::AllTime => "Across All Time".to_string(),
        _ => format!("In {}", month_name(window.start.month())),
    }
}

/// Every point is plotted; past [`TICK_LABEL_STRIDE`] points only every
/// stride-th tick keeps a label.
pub fn chart_data(window: &Window, daily: &[DailyTotal]) -> ChartData {
    let step = if daily.len() > TICK_LABEL_STRIDE {
        TICK_LABEL_STRIDE
    } else {
        1
    };

    let ticks = daily
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(index, day)| ChartTick {
            index,
            label: day.date.format("%b %d").to_string(),
        })
        .collect();

    ChartData {
        title: chart_title(window),
        points: daily.to_vec(),
        ticks,
    }
}

// -- Time-window options --

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthOption {
    pub number: u32,
    pub name: &'static str,
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

pub fn month_options() -> Vec<MonthOption> {
    (1..=12)
        .map(|number| MonthOption {
            number,
            name: month_name(number),
        })
        .collect()
}

/// Years from the current one back to the earliest record's, descending.
pub fn year_options(earliest_year: i32, now: DateTime<Utc>) -> Vec<i32> {
    (earliest_year..=now.year()).rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn incident(occurred_at: DateTime<Utc>, number_affected: i32, fatal: bool) -> Incident {
        Incident {
            id: Uuid::new_v4(),
            occurred_at,
            location: "Downtown".to_string(),
            number_affected,
            narcan_doses_administered: None,
            report_text: String::new(),
            fatal_incident: fatal,
            coordinates: None,
            created_at: occurred_at,
        }
    }

    fn march_2024() -> Window {
        Window::resolve(
            TimePeriod::Month { year: 2024, month: 3 },
            at(2024, 1, 1, 0, 0),
            at(2024, 6, 1, 0, 0),
        )
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_time_period_tokens() {
        assert_eq!(TimePeriod::parse(None).unwrap(), TimePeriod::CurrentMonth);
        assert_eq!(TimePeriod::parse(Some("")).unwrap(), TimePeriod::CurrentMonth);
        assert_eq!(TimePeriod::parse(Some("all_time")).unwrap(), TimePeriod::AllTime);
        assert_eq!(
            TimePeriod::parse(Some("2024-03")).unwrap(),
            TimePeriod::Month { year: 2024, month: 3 }
        );
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for token in ["2024-3", "2024-13", "2024-00", "March", "24-03", "2024-03-01"] {
            let err = TimePeriod::parse(Some(token)).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{token} accepted");
        }
    }

    #[test]
    fn month_window_bounds() {
        let w = march_2024();
        assert_eq!(w.start, at(2024, 3, 1, 0, 0));
        assert_eq!(
            w.end,
            at(2024, 3, 31, 23, 59) + Duration::seconds(59) + Duration::microseconds(999_999)
        );
        assert_eq!(w.token(), "2024-03");
    }

    #[test]
    fn december_window_ends_on_new_years_eve() {
        let w = Window::resolve(
            TimePeriod::Month { year: 2023, month: 12 },
            at(2023, 1, 1, 0, 0),
            at(2024, 1, 5, 0, 0),
        )
        .unwrap();
        assert_eq!(w.end.date_naive(), day(2023, 12, 31));
    }

    #[test]
    fn current_month_uses_now() {
        let now = at(2024, 2, 10, 15, 30);
        let w = Window::resolve(TimePeriod::CurrentMonth, at(2023, 5, 1, 0, 0), now).unwrap();
        assert_eq!(w.period, TimePeriod::Month { year: 2024, month: 2 });
        assert_eq!(w.start, at(2024, 2, 1, 0, 0));
        assert_eq!(w.end.date_naive(), day(2024, 2, 29));
    }

    #[test]
    fn all_time_window_starts_at_earliest_midnight() {
        let now = at(2024, 4, 2, 8, 0);
        let w = Window::resolve(TimePeriod::AllTime, at(2023, 11, 7, 18, 45), now).unwrap();
        assert_eq!(w.start, at(2023, 11, 7, 0, 0));
        assert_eq!(w.end, now);
        assert_eq!(w.token(), "all_time");
    }

    #[test]
    fn ordinal_labels_ranges_and_singles() {
        let rows = vec![
            incident(at(2024, 3, 1, 10, 0), 2, false),
            incident(at(2024, 3, 3, 10, 0), 1, true),
        ];
        assert_eq!(ordinal_labels(&rows), vec!["1 - 2", "3"]);
    }

    #[test]
    fn ordinal_labels_reset_at_month_boundary() {
        let rows = vec![
            incident(at(2024, 1, 30, 10, 0), 1, false),
            incident(at(2024, 1, 31, 10, 0), 3, false),
            incident(at(2024, 2, 1, 0, 0), 1, false),
            incident(at(2024, 2, 2, 0, 0), 2, false),
            incident(at(2025, 2, 2, 0, 0), 1, false),
        ];
        assert_eq!(
            ordinal_labels(&rows),
            vec!["1", "2 - 4", "1", "2 - 3", "1"]
        );
    }

    #[test]
    fn enumerate_preserves_order_and_length() {
        let rows = vec![
            incident(at(2024, 3, 1, 10, 0), 1, false),
            incident(at(2024, 3, 2, 10, 0), 1, false),
        ];
        let enumerated = enumerate_incidents(&rows);
        assert_eq!(enumerated.len(), rows.len());
        assert_eq!(enumerated[0].incident, rows[0]);
        assert_eq!(enumerated[1].ordinal_label, "2");
        assert!(enumerate_incidents(&[]).is_empty());
    }

    #[test]
    fn daily_totals_zero_fill_scenario() {
        let rows = vec![
            incident(at(2024, 3, 1, 10, 0), 2, false),
            incident(at(2024, 3, 3, 10, 0), 1, true),
        ];
        let w = march_2024();
        // Pretend "now" is partway through the 3rd so the series stops there.
        let now = at(2024, 3, 3, 18, 0);
        let daily = incidents_per_day(&w, &rows, now);
        assert_eq!(
            daily,
            vec![
                DailyTotal { date: day(2024, 3, 1), total: 2 },
                DailyTotal { date: day(2024, 3, 2), total: 0 },
                DailyTotal { date: day(2024, 3, 3), total: 1 },
            ]
        );

        let peak = highest_incident_day(&daily);
        assert_eq!(peak.date, Some(day(2024, 3, 1)));
        assert_eq!(peak.total, 2);
    }

    #[test]
    fn daily_totals_cover_closed_month_without_gaps() {
        let rows = vec![incident(at(2024, 3, 15, 10, 0), 4, false)];
        let w = march_2024();
        let daily = incidents_per_day(&w, &rows, at(2024, 6, 1, 0, 0));
        assert_eq!(daily.len(), 31);
        for pair in daily.windows(2) {
            assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
        let sum: i64 = daily.iter().map(|d| d.total).sum();
        let metrics = compute_metrics(&w, &rows, 0, at(2024, 6, 1, 0, 0));
        assert_eq!(sum, metrics.od_count_since_window_start);
    }

    #[test]
    fn daily_totals_empty_for_future_window() {
        let w = Window::resolve(
            TimePeriod::Month { year: 2030, month: 1 },
            at(2024, 1, 1, 0, 0),
            at(2024, 6, 1, 0, 0),
        )
        .unwrap();
        assert!(incidents_per_day(&w, &[], at(2024, 6, 1, 0, 0)).is_empty());
    }

    #[test]
    fn peak_day_ties_keep_first() {
        let daily = vec![
            DailyTotal { date: day(2024, 3, 1), total: 1 },
            DailyTotal { date: day(2024, 3, 2), total: 3 },
            DailyTotal { date: day(2024, 3, 3), total: 3 },
        ];
        assert_eq!(highest_incident_day(&daily).date, Some(day(2024, 3, 2)));
    }

    #[test]
    fn peak_day_all_zero_is_none() {
        let daily = vec![DailyTotal { date: day(2024, 3, 1), total: 0 }];
        assert_eq!(highest_incident_day(&daily), PeakDay { date: None, total: 0 });
        assert_eq!(highest_incident_day(&[]), PeakDay { date: None, total: 0 });
    }

    #[test]
    fn metrics_for_closed_month() {
        let rows = vec![
            incident(at(2024, 3, 1, 10, 0), 2, false),
            incident(at(2024, 3, 3, 10, 0), 1, true),
        ];
        let w = march_2024();
        let now = at(2024, 6, 1, 0, 0);
        let m = compute_metrics(&w, &rows, 0, now);

        assert_eq!(m.od_count_since_window_start, 3);
        assert_eq!(m.fatalities_since_window_start, 1);
        assert!((m.days_elapsed - 31.0).abs() < 1e-6);
        assert_eq!(round5(m.average_incidents_per_day.unwrap()), 0.09677);
        assert_eq!(round5(m.average_fatal_incidents_per_day.unwrap()), 0.03226);
        // The window closes a microsecond short of 31 days, so 248 hours floors down.
        let between = m.average_time_between_ods.unwrap();
        assert_eq!(between.hours, 247);
        assert_eq!(between.minutes, 59);
        assert_eq!(
            m.time_between_fatal_incidents.unwrap(),
            DaysHoursMinutes { days: 30, hours: 23, minutes: 59 }
        );
        assert_eq!(m.projected_end_of_month_total, 3);
    }

    #[test]
    fn metrics_without_fatalities_report_none() {
        let rows = vec![incident(at(2024, 3, 1, 10, 0), 1, false)];
        let m = compute_metrics(&march_2024(), &rows, 0, at(2024, 6, 1, 0, 0));
        assert_eq!(m.average_fatal_incidents_per_day, Some(0.0));
        assert!(m.time_between_fatal_incidents.is_none());
    }

    #[test]
    fn metrics_with_zero_elapsed_days_are_undefined() {
        let now = at(2024, 3, 5, 0, 0);
        let w = Window::resolve(TimePeriod::AllTime, at(2024, 3, 5, 0, 0), now).unwrap();
        let rows = vec![incident(now, 1, true)];
        let m = compute_metrics(&w, &rows, 1, now);

        assert_eq!(m.days_elapsed, 0.0);
        assert!(m.average_incidents_per_day.is_none());
        assert!(m.average_fatal_incidents_per_day.is_none());
        assert!(m.time_between_fatal_incidents.is_none());
        assert_eq!(m.projected_end_of_month_total, 1);
    }

    #[test]
    fn metrics_without_incidents_have_no_time_between() {
        let m = compute_metrics(&march_2024(), &[], 0, at(2024, 6, 1, 0, 0));
        assert_eq!(m.od_count_since_window_start, 0);
        assert!(m.average_time_between_ods.is_none());
        assert_eq!(m.average_incidents_per_day, Some(0.0));
    }

    #[test]
    fn all_time_counts_stop_at_now() {
        let now = at(2024, 3, 11, 0, 0);
        let rows = vec![
            incident(at(2024, 3, 1, 0, 0), 5, false),
            incident(at(2024, 3, 20, 0, 0), 7, false),
        ];
        let w = Window::resolve(TimePeriod::AllTime, rows[0].occurred_at, now).unwrap();
        let m = compute_metrics(&w, &rows, 0, now);
        assert_eq!(m.od_count_since_window_start, 5);
        assert!((m.days_elapsed - 10.0).abs() < 1e-9);
        assert_eq!(m.average_incidents_per_day, Some(0.5));
    }

    #[test]
    fn projection_extends_open_month() {
        let w = march_2024();
        let now = at(2024, 3, 16, 0, 0);
        // 16 days minus one microsecond remain until the window closes.
        let projected = projected_total(&w, 10, Some(1.0), now);
        assert_eq!(projected, 25);
    }

    #[test]
    fn projection_of_closed_window_is_count() {
        let w = march_2024();
        assert_eq!(projected_total(&w, 9, Some(2.5), at(2024, 4, 1, 0, 0)), 9);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(HoursMinutes::from_hours(5.75).to_string(), "5 hours, 45 minutes");
        assert_eq!(
            DaysHoursMinutes::from_days(2.5).to_string(),
            "2 days, 12 hours, 0 minutes"
        );
    }

    #[test]
    fn fractional_days_keeps_sub_day_precision() {
        assert_eq!(fractional_days(Duration::hours(36)), 1.5);
        assert_eq!(fractional_days(Duration::zero()), 0.0);
    }

    #[test]
    fn chart_titles() {
        assert_eq!(chart_title(&march_2024()), "In March");
        let now = at(2024, 3, 2, 0, 0);
        let all = Window::resolve(TimePeriod::AllTime, at(2024, 1, 1, 0, 0), now).unwrap();
        assert_eq!(chart_title(&all), "Across All Time");
    }

    #[test]
    fn chart_labels_every_day_for_a_month() {
        let w = march_2024();
        let daily = incidents_per_day(&w, &[], at(2024, 6, 1, 0, 0));
        let chart = chart_data(&w, &daily);
        assert_eq!(chart.points.len(), 31);
        assert_eq!(chart.ticks.len(), 31);
        assert_eq!(chart.ticks[0].label, "Mar 01");
    }

    #[test]
    fn chart_thins_labels_for_long_series() {
        let now = at(2024, 3, 31, 12, 0);
        let w = Window::resolve(TimePeriod::AllTime, at(2024, 1, 1, 0, 0), now).unwrap();
        let daily = incidents_per_day(&w, &[], now);
        assert_eq!(daily.len(), 91);
        let chart = chart_data(&w, &daily);
        assert_eq!(chart.points.len(), 91);
        let indices: Vec<usize> = chart.ticks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 31, 62]);
        assert_eq!(chart.ticks[1].label, "Feb 01");
    }

    #[test]
    fn month_and_year_options() {
        let months = month_options();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], MonthOption { number: 1, name: "January" });
        assert_eq!(months[11].name, "December");
        assert_eq!(
            year_options(2021, at(2024, 5, 1, 0, 0)),
            vec![2024, 2023, 2022, 2021]
        );
    }

    #[test]
    fn od_count_on_sums_affected() {
        let rows = vec![
            incident(at(2024, 3, 1, 1, 0), 2, false),
            incident(at(2024, 3, 1, 23, 0), 3, false),
            incident(at(2024, 3, 2, 0, 0), 1, false),
        ];
        assert_eq!(od_count_on(&rows, day(2024, 3, 1)), 5);
        assert_eq!(od_count_on(&rows, day(2024, 3, 9)), 0);
    }
}
