//! Department commands.

use std::io::Write;

use anyhow::Result;

use att_core::DepartmentSummary;
use att_db::Database;

pub fn add<W: Write>(writer: &mut W, db: &Database, name: &str) -> Result<()> {
    let department = db.insert_department(name)?;
    tracing::info!(id = department.id, name = %department.name, "created department");
    writeln!(writer, "Created department #{}: {}", department.id, department.name)?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let departments = db.list_departments()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&departments)?)?;
    } else {
        write!(writer, "{}", format_departments(&departments))?;
    }
    Ok(())
}

fn format_departments(departments: &[DepartmentSummary]) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    if departments.is_empty() {
        writeln!(output, "No departments.").unwrap();
        return output;
    }

    writeln!(output, "{:<4}  {:<24}  {:>9}", "ID", "Name", "Employees").unwrap();
    for department in departments {
        let marker = if department.active { "" } else { "  (inactive)" };
        writeln!(
            output,
            "{:<4}  {:<24}  {:>9}{marker}",
            department.id, department.name, department.employees
        )
        .unwrap();
    }
    output
}
