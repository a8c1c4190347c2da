//! CSV export of logged sets.

use crate::{Result, SetRecord, WorkoutEntry};
use std::path::Path;

/// A row in the CSV output, one per set
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    exercise: &'a str,
    set: u32,
    reps: u32,
    weight_kg: f64,
    weight_lbs: f64,
    weight_unit: &'static str,
}

impl<'a> CsvRow<'a> {
    fn new(entry: &'a WorkoutEntry, set: &SetRecord) -> Self {
        CsvRow {
            date: entry.date.to_string(),
            exercise: &entry.record.name,
            set: set.set,
            reps: set.reps,
            weight_kg: set.weight.weight_kg,
            weight_lbs: set.weight.weight_lbs,
            weight_unit: set.weight.weight_unit.as_str(),
        }
    }
}

/// Write every set of `entries` to a CSV file, replacing it
///
/// Returns the number of rows written.
pub fn export_csv(entries: &[WorkoutEntry], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;
    for entry in entries {
        for set in &entry.record.sets {
            writer.serialize(CsvRow::new(entry, set))?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} sets to {:?}", rows, path);
    Ok(rows)
}
