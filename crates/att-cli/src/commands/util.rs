//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use att_core::date::today_in;
use att_core::geofence::GeoPoint;
use att_core::{Coordinate, Employee, EmployeeKey};
use att_db::Database;
use chrono_tz::Tz;

use crate::cli::DateArgs;

/// Parses an employee id, uuid or handle.
pub fn employee_key(s: &str) -> Result<EmployeeKey> {
    s.parse()
        .with_context(|| format!("invalid employee reference: {s:?}"))
}

/// Looks up an employee, active or not, failing when it does not exist.
pub fn require_employee(db: &Database, reference: &str) -> Result<Employee> {
    let key = employee_key(reference)?;
    db.find_employee(&key)?
        .with_context(|| format!("employee not found: {key}"))
}

/// Builds the request date, filling missing components from `today`.
pub fn date_from_args(args: &DateArgs, today: NaiveDate) -> Result<NaiveDate> {
    let day = args.day.clone().unwrap_or_else(|| today.day().to_string());
    let month = args
        .month
        .clone()
        .unwrap_or_else(|| today.month().to_string());
    let year = args
        .year
        .clone()
        .unwrap_or_else(|| today.year().to_string());
    Ok(att_core::request_date(&day, &month, &year)?)
}

/// Builds the request date relative to today in `tz`.
pub fn request_date(args: &DateArgs, tz: Tz) -> Result<NaiveDate> {
    date_from_args(args, today_in(tz))
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD"))
}

/// Parses an RFC 3339 instant.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp {s:?}, expected RFC 3339"))
}

/// Parses a `LAT,LON` boundary point, keeping the text as entered.
pub fn parse_point(s: &str) -> Result<Coordinate> {
    let (latitude, longitude) = s
        .split_once(',')
        .with_context(|| format!("invalid point {s:?}, expected LAT,LON"))?;
    let coordinate = Coordinate {
        latitude: latitude.trim().to_string(),
        longitude: longitude.trim().to_string(),
    };
    GeoPoint::try_from(&coordinate)?;
    Ok(coordinate)
}
