//! Pivot rows: a symbol and the swing date projections start from.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::error::SwingError;

pub const PIVOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const PIVOT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    /// 1-based line in the source table, header included.
    pub line: usize,
    pub symbol: String,
    pub pivot: NaiveDate,
}

impl PivotRow {
    /// Validate raw `Script` / `Date` cells. Any time of day is dropped.
    pub fn parse(line: usize, symbol: &str, date: &str) -> Result<Self, SwingError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(SwingError::PivotRow {
                line,
                reason: "empty Script".into(),
            });
        }
        let pivot = parse_pivot_date(date).ok_or_else(|| SwingError::PivotRow {
            line,
            reason: format!("invalid Date '{}', expected YYYY-MM-DD HH:MM:SS", date.trim()),
        })?;
        Ok(Self {
            line,
            symbol: symbol.to_string(),
            pivot,
        })
    }
}

pub fn parse_pivot_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, PIVOT_TIMESTAMP_FORMAT)
        .map(|ts| ts.date())
        .or_else(|_| NaiveDate::parse_from_str(input, PIVOT_DATE_FORMAT))
        .ok()
}
