//! CSV pivot table reader and projection table writer.

use std::path::PathBuf;

use crate::domain::calendar::format_day_month_year;
use crate::domain::date_index::RowProjection;
use crate::domain::error::SwingError;
use crate::domain::pivot::{PIVOT_DATE_FORMAT, PivotRow};
use crate::domain::projection::DegreeKey;
use crate::ports::pivot_port::{PivotSource, ProjectionSink};

pub const SCRIPT_COLUMN: &str = "Script";
pub const DATE_COLUMN: &str = "Date";

/// Reads `Script` / `Date` columns from a headed CSV, in any column order.
pub struct PivotCsvReader {
    path: PathBuf,
}

impl PivotCsvReader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, SwingError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| SwingError::Data {
            reason: format!("pivot table has no '{}' column", name),
        })
}

impl PivotSource for PivotCsvReader {
    fn read_rows(&self) -> Result<Vec<Result<PivotRow, SwingError>>, SwingError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let headers = rdr.headers()?.clone();
        let script_idx = column_index(&headers, SCRIPT_COLUMN)?;
        let date_idx = column_index(&headers, DATE_COLUMN)?;

        let rows = rdr
            .records()
            .enumerate()
            .map(|(i, record)| {
                let line = i + 2;
                let record = record.map_err(|e| SwingError::PivotRow {
                    line,
                    reason: e.to_string(),
                })?;
                PivotRow::parse(
                    line,
                    record.get(script_idx).unwrap_or_default(),
                    record.get(date_idx).unwrap_or_default(),
                )
            })
            .collect();
        Ok(rows)
    }
}

/// Writes each projected row as `Script, Date, Degree_<d>_Date..., Degree_<d>_Second_Cycle_Date...`.
pub struct ProjectionCsvWriter {
    path: PathBuf,
}

impl ProjectionCsvWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

pub fn projection_header(degrees: &[u32]) -> Vec<String> {
    let mut header = vec![SCRIPT_COLUMN.to_string(), DATE_COLUMN.to_string()];
    header.extend(degrees.iter().map(|&d| DegreeKey::CycleOne(d).column_name()));
    header.extend(degrees.iter().map(|&d| DegreeKey::CycleTwo(d).column_name()));
    header
}

fn projection_record(projection: &RowProjection, degrees: &[u32]) -> Vec<String> {
    let cell = |key: DegreeKey| {
        let cycle = match key {
            DegreeKey::CycleOne(_) => &projection.projection.cycle_one,
            DegreeKey::CycleTwo(_) => &projection.projection.cycle_two,
        };
        cycle.get(key).map(format_day_month_year).unwrap_or_default()
    };

    let mut record = vec![
        projection.row.symbol.clone(),
        projection.row.pivot.format(PIVOT_DATE_FORMAT).to_string(),
    ];
    record.extend(degrees.iter().map(|&d| cell(DegreeKey::CycleOne(d))));
    record.extend(degrees.iter().map(|&d| cell(DegreeKey::CycleTwo(d))));
    record
}

impl ProjectionSink for ProjectionCsvWriter {
    fn write(&self, projections: &[RowProjection], degrees: &[u32]) -> Result<(), SwingError> {
        let mut wtr = csv::Writer::from_path(&self.path)?;
        wtr.write_record(projection_header(degrees))?;
        for projection in projections {
            wtr.write_record(projection_record(projection, degrees))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
