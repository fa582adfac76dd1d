//! Record commands: append entry and exit attempts.
//!
//! The status of a new attempt is decided here, once, from the geofence,
//! the lateness threshold and any vacation covering the local day. Resolution
//! later trusts the stored status.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;

use att_core::geofence::{GeoPoint, classify_entry, classify_exit};
use att_core::Employee;
use att_db::{Database, NewControlEvent};

use super::util::{parse_instant, require_employee};
use crate::cli::RecordArgs;

/// Settings that decide how an attempt is classified.
#[derive(Debug, Clone, Copy)]
pub struct RecordSettings {
    pub timezone: Tz,
    pub late_after: NaiveTime,
}

pub fn entry<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &RecordArgs,
    settings: &RecordSettings,
) -> Result<()> {
    let employee = active_employee(db, &args.employee)?;
    let inside = inside_area(db, args)?;
    let created = created_at(args)?;
    let local = created.with_timezone(&settings.timezone);

    let on_vacation = !db
        .vacations_covering(employee.id, local.date_naive())?
        .is_empty();
    let status = classify_entry(inside, on_vacation, local.time(), settings.late_after);

    let event = db.append_entry(&NewControlEvent {
        employee_id: employee.id,
        area_id: args.area,
        status,
        latitude: args.lat.clone(),
        longitude: args.lon.clone(),
        image: args.image.clone(),
        created,
    })?;
    tracing::info!(id = event.id, employee = employee.id, %status, "recorded entry");

    writeln!(
        writer,
        "Recorded entry #{} for {}: {} at {}",
        event.id,
        employee.full_name,
        status,
        local.format("%H:%M")
    )?;
    Ok(())
}

pub fn exit<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &RecordArgs,
    settings: &RecordSettings,
) -> Result<()> {
    let employee = active_employee(db, &args.employee)?;
    let inside = inside_area(db, args)?;
    let created = created_at(args)?;
    let local = created.with_timezone(&settings.timezone);
    let status = classify_exit(inside);

    let event = db.append_exit(&NewControlEvent {
        employee_id: employee.id,
        area_id: args.area,
        status,
        latitude: args.lat.clone(),
        longitude: args.lon.clone(),
        image: args.image.clone(),
        created,
    })?;
    tracing::info!(id = event.id, employee = employee.id, %status, "recorded exit");

    writeln!(
        writer,
        "Recorded exit #{} for {}: {} at {}",
        event.id,
        employee.full_name,
        status,
        local.format("%H:%M")
    )?;
    Ok(())
}

fn active_employee(db: &Database, reference: &str) -> Result<Employee> {
    let employee = require_employee(db, reference)?;
    if !employee.active {
        bail!("employee #{} is inactive", employee.id);
    }
    Ok(employee)
}

/// Checks the reported position against the area. Without an area there is
/// nothing to check against.
fn inside_area(db: &Database, args: &RecordArgs) -> Result<bool> {
    let point = match (&args.lat, &args.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::parse(lat, lon)?),
        (None, None) => None,
        _ => bail!("--lat and --lon must be given together"),
    };

    let Some(area_id) = args.area else {
        return Ok(true);
    };
    let area = db
        .area(area_id)?
        .with_context(|| format!("area not found: #{area_id}"))?;
    let point = point.context("--lat and --lon are required with --area")?;

    let inside = area.contains(point)?;
    tracing::debug!(area = area.id, inside, "checked geofence");
    Ok(inside)
}

fn created_at(args: &RecordArgs) -> Result<chrono::DateTime<Utc>> {
    args.at
        .as_deref()
        .map(parse_instant)
        .transpose()
        .map(|at| at.unwrap_or_else(Utc::now))
}
