//! Roster command: every active employee, one day.

use std::io::Write;

use anyhow::Result;

use att_core::date::format_day;
use att_core::{RosterRequest, RosterRow, build_roster};
use att_db::Database;

use super::resolve::{entry_cell, exit_cell};

pub fn run<W: Write>(writer: &mut W, db: &Database, request: &RosterRequest, json: bool) -> Result<()> {
    let rows = build_roster(db, request)?;
    tracing::debug!(rows = rows.len(), "built roster");

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write!(writer, "{}", format_roster(&rows, request))?;
    }
    Ok(())
}

fn format_roster(rows: &[RosterRow], request: &RosterRequest) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    writeln!(output, "ROSTER {}", format_day(request.date)).unwrap();
    writeln!(output).unwrap();

    if rows.is_empty() {
        writeln!(output, "No active employees.").unwrap();
        return output;
    }

    let with_exit = request.options.variant.includes_location();
    if with_exit {
        writeln!(output, "{:<4}  {:<20}  {:<30}  Exit", "ID", "Full name", "Entry").unwrap();
    } else {
        writeln!(output, "{:<4}  {:<20}  Entry", "ID", "Full name").unwrap();
    }

    for row in rows {
        let prefix = format!("{:<4}  {:<20}", row.employee.id, row.employee.full_name);
        match (&row.attendance, &row.error) {
            (Some(record), _) => {
                let entry = entry_cell(record);
                match exit_cell(record).filter(|_| with_exit) {
                    Some(exit) => {
                        writeln!(output, "{prefix}  {entry:<30}  {exit}").unwrap();
                    }
                    None => {
                        writeln!(output, "{prefix}  {entry}").unwrap();
                    }
                }
            }
            (None, Some(error)) => {
                writeln!(output, "{prefix}  error: {error}").unwrap();
            }
            (None, None) => {
                writeln!(output, "{prefix}").unwrap();
            }
        }
    }
    output
}
