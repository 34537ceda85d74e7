// src/io/reporting.rs

use crate::simulation::engine::DayRecord;
use std::path::Path;
use tracing::info;

/// Writes the per-day manufacturer history to a CSV file.
///
/// # Arguments
/// * `file_path` - Where to save the file (e.g., "results/game_1.csv").
/// * `data` - The day records returned by `Manufacturer::finish`.
pub fn write_day_log(file_path: impl AsRef<Path>, data: &[DayRecord]) -> Result<(), csv::Error> {
    let path = file_path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;

    for record in data {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    info!(rows = data.len(), path = %path.display(), "exported day log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_row_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("days.csv");
        let records = vec![
            DayRecord {
                day: 1,
                offers_sent: 3,
                ..Default::default()
            },
            DayRecord {
                day: 2,
                deliveries: 1,
                ..Default::default()
            },
        ];

        write_day_log(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("day,offers_sent,orders_accepted"));
        assert!(lines[1].starts_with("1,3,"));
    }
}
