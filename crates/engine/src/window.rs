//! Date windows used to scope transaction listings and summaries.
//!
//! A window is either given explicitly by the caller or derived from a
//! [`ViewType`] and the current instant. Calendar periods are computed in a
//! configurable timezone and weeks start on [`WEEK_START`].

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// First day of a calendar week.
pub const WEEK_START: Weekday = Weekday::Sun;

/// Coarse time bucket selected when no explicit bounds are given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewType {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl ViewType {
    /// Parse the `viewType` query value. Unknown or missing values fall back
    /// to [`ViewType::Monthly`].
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("weekly") => Self::Weekly,
            Some("yearly") => Self::Yearly,
            _ => Self::Monthly,
        }
    }
}

/// Inclusive date range. A missing bound means unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Resolve the window for a listing.
///
/// Explicit bounds always win over `view`: if either `start` or `end` is
/// present the calendar period is ignored entirely.
pub fn resolve(
    view: ViewType,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    timezone: Tz,
) -> DateWindow {
    match (start, end) {
        (None, None) => calendar_window(view, now, timezone),
        (from, to) => DateWindow { from, to },
    }
}

fn calendar_window(view: ViewType, now: DateTime<Utc>, timezone: Tz) -> DateWindow {
    let today = now.with_timezone(&timezone).date_naive();
    let (first, next) = match view {
        ViewType::Weekly => {
            let offset = (7 + today.weekday().num_days_from_monday()
                - WEEK_START.num_days_from_monday())
                % 7;
            let first = today - Duration::days(i64::from(offset));
            (first, first + Duration::days(7))
        }
        ViewType::Monthly => {
            let first = today.with_day(1).unwrap_or(today);
            (first, add_months(first, 1))
        }
        ViewType::Yearly => {
            let first = today.with_ordinal(1).unwrap_or(today);
            (first, add_months(first, 12))
        }
    };

    DateWindow {
        from: Some(start_of_day(first, timezone)),
        to: Some(start_of_day(next, timezone) - Duration::milliseconds(1)),
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// First instant of `date` in `timezone`, skipping forward when midnight
/// falls into a DST gap.
fn start_of_day(date: NaiveDate, timezone: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            timezone
                .from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Parse a user supplied instant.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and
/// plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_instant(value: &str) -> ResultEngine<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(EngineError::Validation(format!("invalid date: {value}")))
}
