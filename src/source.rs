//! Row sources: service records, truck characteristics, battery profile.

use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::record::columns;
use crate::domain::{CurvePoint, RawRow, ServiceRecord};
use crate::error::{Error, Result};
use crate::lookup::TruckTables;

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Read tabular rows from a `.csv` file (every cell is text) or a `.json`
/// array of objects.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>> {
    let path = path.as_ref();

    let rows = match extension(path).as_str() {
        "csv" => {
            let mut reader = csv_reader(path)?;
            let headers = reader.headers()?.clone();
            let mut rows = Vec::new();
            for result in reader.records() {
                let record = result?;
                let row: RawRow = headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        let cell = record.get(i).unwrap_or("");
                        (h.to_string(), Value::String(cell.to_string()))
                    })
                    .collect();
                rows.push(row);
            }
            rows
        }
        "json" => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<RawRow>>(&text)?
        }
        other => return Err(Error::UnsupportedExtension(other.to_string())),
    };

    debug!(path = %path.display(), rows = rows.len(), "read rows");
    Ok(rows)
}

/// Keep rows whose trimmed `mode` equals `mode`; `None` keeps every row
pub fn filter_by_mode(rows: Vec<RawRow>, mode: Option<&str>) -> Vec<RawRow> {
    let Some(mode) = mode else {
        return rows;
    };
    rows.into_iter()
        .filter(|row| match row.get(columns::MODE) {
            Some(Value::String(s)) => s.trim() == mode,
            Some(other) => other.to_string() == mode,
            None => false,
        })
        .collect()
}

/// Keep records whose departure day lies within the inclusive bounds.
///
/// Without bounds everything is kept. With at least one bound, records
/// without a readable departure day are dropped.
pub fn filter_by_departure_day(
    records: Vec<ServiceRecord>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<ServiceRecord> {
    if start.is_none() && end.is_none() {
        return records;
    }
    let before = records.len();
    let kept: Vec<ServiceRecord> = records
        .into_iter()
        .filter(|r| match r.departure_day {
            Some(day) => start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e),
            None => false,
        })
        .collect();
    info!(before, after = kept.len(), "filtered records by departure day");
    kept
}

/// Build the capacity, consumption and charging-power tables
pub fn load_truck_tables(path: impl AsRef<Path>) -> Result<TruckTables> {
    let rows = read_rows(path)?;
    Ok(TruckTables::from_rows(&rows))
}

/// Read the `(x, y)` charging curve from the first two CSV columns.
///
/// Blank or unparsable rows are skipped; values are truncated to integers.
pub fn load_battery_profile(path: impl AsRef<Path>) -> Result<Vec<CurvePoint>> {
    let path = path.as_ref();
    let mut reader = csv_reader(path)?;
    let mut profile = Vec::new();

    for result in reader.records() {
        let record = result?;
        let cell = |i: usize| {
            record
                .get(i)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        if let (Some(x), Some(y)) = (cell(0), cell(1)) {
            profile.push(CurvePoint {
                x: x.trunc() as i64,
                y: y.trunc() as i64,
            });
        }
    }

    debug!(path = %path.display(), points = profile.len(), "loaded battery profile");
    Ok(profile)
}
