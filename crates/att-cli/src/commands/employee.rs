//! Employee commands.

use std::io::Write;

use anyhow::{Context, Result, bail};

use att_core::Employee;
use att_db::{Database, NewEmployee};

use super::util::employee_key;

pub fn add<W: Write>(writer: &mut W, db: &Database, new: &NewEmployee) -> Result<()> {
    let employee = db
        .insert_employee(new)
        .context("failed to create employee")?;
    tracing::info!(id = employee.id, uuid = %employee.uuid, "created employee");
    writeln!(
        writer,
        "Created employee #{}: {} ({})",
        employee.id, employee.full_name, employee.handle
    )?;
    writeln!(writer, "uuid: {}", employee.uuid)?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let employees = db.list_employees()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&employees)?)?;
    } else {
        write!(writer, "{}", format_employees(&employees))?;
    }
    Ok(())
}

pub fn deactivate<W: Write>(writer: &mut W, db: &Database, reference: &str) -> Result<()> {
    let key = employee_key(reference)?;
    if !db.set_employee_active(&key, false)? {
        bail!("employee not found: {key}");
    }
    tracing::info!(employee = %key, "deactivated employee");
    writeln!(writer, "Deactivated employee {key}")?;
    Ok(())
}

fn format_employees(employees: &[Employee]) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    if employees.is_empty() {
        writeln!(output, "No employees.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<4}  {:<36}  {:<10}  {:<20}  {:<4}  Position",
        "ID", "UUID", "Handle", "Full name", "Dept"
    )
    .unwrap();
    for employee in employees {
        let department = employee
            .department_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let marker = if employee.active { "" } else { "  (inactive)" };
        writeln!(
            output,
            "{:<4}  {:<36}  {:<10}  {:<20}  {:<4}  {}{marker}",
            employee.id,
            employee.uuid,
            employee.handle,
            employee.full_name,
            department,
            employee.position
        )
        .unwrap();
    }
    output
}
