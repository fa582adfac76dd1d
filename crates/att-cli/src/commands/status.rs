//! Status command for showing what the database holds.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use att_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let counts = db.counts()?;

    writeln!(writer, "Attendance tracker status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Departments:      {}", counts.departments)?;
    writeln!(writer, "Areas:            {}", counts.areas)?;
    writeln!(writer, "Active employees: {}", counts.active_employees)?;
    writeln!(writer, "Entries:          {}", counts.entries)?;
    writeln!(writer, "Exits:            {}", counts.exits)?;
    writeln!(writer, "Vacations:        {}", counts.vacations)?;

    Ok(())
}
