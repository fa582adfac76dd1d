//! Vacation commands.

use std::io::Write;

use anyhow::{Result, bail};

use att_core::date::format_day;
use att_core::VacationInterval;
use att_db::{Database, NewVacation};

use super::util::{parse_calendar_date, require_employee};

/// Fields of `att vacation add`.
#[derive(Debug, Clone, Default)]
pub struct VacationInput<'a> {
    pub employee: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub kind: Option<&'a str>,
    pub file: Option<&'a str>,
}

pub fn add<W: Write>(writer: &mut W, db: &Database, input: &VacationInput<'_>) -> Result<()> {
    let employee = require_employee(db, input.employee)?;
    let vacation = db.insert_vacation(&NewVacation {
        employee_id: employee.id,
        kind: input.kind.map(str::to_string),
        file: input.file.map(str::to_string),
        start: parse_calendar_date(input.start)?,
        end: parse_calendar_date(input.end)?,
    })?;
    tracing::info!(id = vacation.id, employee = employee.id, "added vacation");

    writeln!(
        writer,
        "Added vacation #{} for {}: {}",
        vacation.id,
        employee.full_name,
        describe(&vacation)
    )?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, reference: &str, json: bool) -> Result<()> {
    let employee = require_employee(db, reference)?;
    let vacations = db.list_vacations(employee.id)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&vacations)?)?;
        return Ok(());
    }
    if vacations.is_empty() {
        writeln!(writer, "No vacations for {}.", employee.full_name)?;
        return Ok(());
    }
    for vacation in &vacations {
        writeln!(writer, "#{:<4} {}", vacation.id, describe(vacation))?;
    }
    Ok(())
}

pub fn cancel<W: Write>(writer: &mut W, db: &Database, id: i64) -> Result<()> {
    if !db.set_vacation_active(id, false)? {
        bail!("vacation not found: #{id}");
    }
    tracing::info!(id, "cancelled vacation");
    writeln!(writer, "Cancelled vacation #{id}")?;
    Ok(())
}

fn describe(vacation: &VacationInterval) -> String {
    let mut text = format!(
        "{} {} .. {}",
        vacation.kind,
        format_day(vacation.start),
        format_day(vacation.end)
    );
    if let Some(file) = &vacation.file {
        text.push_str(&format!(" [{file}]"));
    }
    text
}
