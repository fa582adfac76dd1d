//! Resolve command: one employee, one day.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use att_core::date::format_day;
use att_core::{AttendanceRecord, EmployeeAttendance, ResolveOptions, VacationView, resolve_employee};
use att_db::Database;

use super::util::employee_key;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    reference: &str,
    date: NaiveDate,
    options: &ResolveOptions,
    json: bool,
) -> Result<()> {
    let key = employee_key(reference)?;
    let attendance = resolve_employee(db, &key, date, options)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&attendance)?)?;
    } else {
        write!(writer, "{}", format_attendance(&attendance, date))?;
    }
    Ok(())
}

fn format_attendance(attendance: &EmployeeAttendance, date: NaiveDate) -> String {
    use std::fmt::Write;

    let employee = &attendance.employee;
    let record = &attendance.record;
    let mut output = String::new();

    writeln!(
        output,
        "{} ({}) #{}",
        employee.full_name, employee.handle, employee.id
    )
    .unwrap();
    writeln!(output, "Date:       {}", format_day(date)).unwrap();
    if let Some(department) = &attendance.department {
        writeln!(
            output,
            "Department: {} ({} active)",
            department.name, department.employees
        )
        .unwrap();
    }
    writeln!(output, "Entry:      {}", entry_cell(record)).unwrap();
    if let Some(exit) = exit_cell(record) {
        writeln!(output, "Exit:       {exit}").unwrap();
    }
    for vacation in record.vocations.iter().flatten() {
        writeln!(output, "Vacation:   {}", vacation_cell(vacation)).unwrap();
    }
    output
}

/// `status time`, plus the area when the record carries one.
pub(crate) fn entry_cell(record: &AttendanceRecord) -> String {
    match &record.entry_area {
        Some(area) => format!("{} {} ({area})", record.entry_status, record.entry_time),
        None => format!("{} {}", record.entry_status, record.entry_time),
    }
}

/// `status time`, or nothing for compact records.
pub(crate) fn exit_cell(record: &AttendanceRecord) -> Option<String> {
    let status = record.exit_status?;
    let time = record.exit_time.as_deref().unwrap_or(att_core::NO_TIME);
    Some(format!("{status} {time}"))
}

fn vacation_cell(vacation: &VacationView) -> String {
    format!("{} {} .. {}", vacation.kind, vacation.start, vacation.end)
}
