//! Area commands.

use std::io::Write;

use anyhow::Result;

use att_core::Area;
use att_db::Database;

use super::util::parse_point;

pub fn add<W: Write>(writer: &mut W, db: &mut Database, name: &str, points: &[String]) -> Result<()> {
    let coordinates = points
        .iter()
        .map(|point| parse_point(point))
        .collect::<Result<Vec<_>>>()?;
    if coordinates.len() < 3 {
        tracing::warn!(name, points = coordinates.len(), "area has fewer than 3 points and will contain nothing");
    }

    let area = db.insert_area(name, &coordinates)?;
    tracing::info!(id = area.id, name = %area.name, "created area");
    writeln!(
        writer,
        "Created area #{}: {} ({} points)",
        area.id,
        area.name,
        area.coordinates.len()
    )?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let areas = db.list_areas()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&areas)?)?;
    } else {
        write!(writer, "{}", format_areas(&areas))?;
    }
    Ok(())
}

fn format_areas(areas: &[Area]) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    if areas.is_empty() {
        writeln!(output, "No areas.").unwrap();
        return output;
    }

    for area in areas {
        let points: Vec<String> = area
            .coordinates
            .iter()
            .map(|c| format!("{},{}", c.latitude, c.longitude))
            .collect();
        let marker = if area.active { "" } else { " (inactive)" };
        writeln!(output, "#{} {}{marker}", area.id, area.name).unwrap();
        writeln!(output, "    {}", points.join("  ")).unwrap();
    }
    output
}
