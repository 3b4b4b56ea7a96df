//! Reverse index from projected calendar date to (symbol, degree) pairs.
//!
//! Built once per batch from pivot rows, read-only afterwards. A row whose
//! pivot is malformed or whose projection fails is recorded as a failure and
//! the remaining rows still contribute.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::calendar::format_day_month_year;
use crate::domain::error::SwingError;
use crate::domain::pivot::PivotRow;
use crate::domain::projection::{DateProjector, DegreeKey, TwoCycleProjection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub symbol: String,
    pub key: DegreeKey,
}

/// Successful projection of one pivot row.
#[derive(Debug, Clone)]
pub struct RowProjection {
    pub row: PivotRow,
    pub projection: TwoCycleProjection,
}

#[derive(Debug)]
pub struct RowFailure {
    pub line: usize,
    pub symbol: Option<String>,
    pub error: SwingError,
}

#[derive(Debug)]
pub struct IndexBuild {
    pub index: ScriptDateIndex,
    pub projections: Vec<RowProjection>,
    pub failures: Vec<RowFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptDateIndex {
    buckets: BTreeMap<NaiveDate, Vec<IndexEntry>>,
}

impl ScriptDateIndex {
    /// Project every row through both cycles and bucket each resulting date.
    ///
    /// Bucket order: row order, then cycle one before cycle two, then degree order.
    pub fn build<I>(projector: &DateProjector, rows: I) -> IndexBuild
    where
        I: IntoIterator<Item = Result<PivotRow, SwingError>>,
    {
        let mut index = ScriptDateIndex::default();
        let mut projections = Vec::new();
        let mut failures = Vec::new();

        for (position, row) in rows.into_iter().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(error) => {
                    let line = match &error {
                        SwingError::PivotRow { line, .. } => *line,
                        _ => position + 1,
                    };
                    warn!(line, %error, "skipping malformed pivot row");
                    failures.push(RowFailure {
                        line,
                        symbol: None,
                        error,
                    });
                    continue;
                }
            };

            match projector.project_cycles(row.pivot) {
                Ok(projection) => {
                    for &(key, date) in projection.iter() {
                        index.insert(date, &row.symbol, key);
                    }
                    debug!(symbol = %row.symbol, pivot = %row.pivot, "projected two cycles");
                    projections.push(RowProjection { row, projection });
                }
                Err(error) => {
                    warn!(line = row.line, symbol = %row.symbol, %error, "projection failed");
                    failures.push(RowFailure {
                        line: row.line,
                        symbol: Some(row.symbol),
                        error,
                    });
                }
            }
        }

        IndexBuild {
            index,
            projections,
            failures,
        }
    }

    fn insert(&mut self, date: NaiveDate, symbol: &str, key: DegreeKey) {
        self.buckets.entry(date).or_default().push(IndexEntry {
            symbol: symbol.to_string(),
            key,
        });
    }

    /// Entries landing on `date`; empty when nothing does.
    pub fn lookup(&self, date: NaiveDate) -> &[IndexEntry] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(dd-mm-yyyy, key)` pairs for `symbol`, matched case-insensitively,
    /// in chronological order.
    pub fn lookup_by_symbol(&self, symbol: &str) -> Vec<(String, DegreeKey)> {
        let wanted = symbol.to_lowercase();
        self.buckets
            .iter()
            .flat_map(|(date, entries)| {
                entries
                    .iter()
                    .filter(|e| e.symbol.to_lowercase() == wanted)
                    .map(move |e| (format_day_month_year(*date), e.key))
            })
            .collect()
    }

    pub fn date_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::HolidayCalendar;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(line: usize, symbol: &str, pivot: NaiveDate) -> Result<PivotRow, SwingError> {
        Ok(PivotRow {
            line,
            symbol: symbol.to_string(),
            pivot,
        })
    }

    #[test]
    fn build_indexes_both_cycles() {
        let projector = DateProjector::default();
        let build = ScriptDateIndex::build(&projector, vec![row(2, "INFY", d(2024, 1, 1))]);

        assert!(build.failures.is_empty());
        assert_eq!(build.projections.len(), 1);
        assert_eq!(build.index.entry_count(), 34);
        assert_eq!(
            build.index.lookup(d(2024, 1, 31)),
            &[IndexEntry {
                symbol: "INFY".into(),
                key: DegreeKey::CycleOne(30)
            }]
        );
        assert_eq!(
            build.index.lookup(d(2025, 1, 30)),
            &[IndexEntry {
                symbol: "INFY".into(),
                key: DegreeKey::CycleTwo(30)
            }]
        );
    }

    #[test]
    fn lookup_missing_date_is_empty() {
        let build = ScriptDateIndex::build(&DateProjector::default(), Vec::new());
        assert!(build.index.is_empty());
        assert!(build.index.lookup(d(2024, 1, 1)).is_empty());
    }

    #[test]
    fn shared_bucket_keeps_row_order() {
        let projector = DateProjector::default();
        let build = ScriptDateIndex::build(
            &projector,
            vec![row(2, "TCS", d(2024, 1, 1)), row(3, "INFY", d(2024, 1, 1))],
        );
        let symbols: Vec<&str> = build
            .index
            .lookup(d(2024, 1, 31))
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["TCS", "INFY"]);
    }

    #[test]
    fn lookup_by_symbol_is_case_insensitive_and_chronological() {
        let projector = DateProjector::default();
        let build = ScriptDateIndex::build(&projector, vec![row(2, "Infy", d(2024, 1, 1))]);
        let hits = build.index.lookup_by_symbol("INFY");
        assert_eq!(hits.len(), 34);
        assert_eq!(hits[0], ("31-01-2024".to_string(), DegreeKey::CycleOne(30)));
        assert_eq!(
            hits.last().cloned(),
            Some(("31-12-2025".to_string(), DegreeKey::CycleTwo(360)))
        );
        assert!(build.index.lookup_by_symbol("TCS").is_empty());
    }

    #[test]
    fn failed_rows_do_not_block_the_rest() {
        let blocked = (1..=28).map(|day| d(2024, 2, day));
        let projector =
            DateProjector::new(HolidayCalendar::new(blocked), vec![30, 360], 1.0, 5).unwrap();
        let rows = vec![
            row(2, "GOOD", d(2024, 3, 4)),
            Err(SwingError::PivotRow {
                line: 3,
                reason: "bad date".into(),
            }),
            row(4, "BLOCKED", d(2024, 1, 5)),
            row(5, "ALSOGOOD", d(2024, 3, 5)),
        ];
        let build = ScriptDateIndex::build(&projector, rows);

        assert_eq!(build.projections.len(), 2);
        assert_eq!(build.failures.len(), 2);
        assert_eq!(build.failures[0].line, 3);
        assert_eq!(build.failures[1].symbol.as_deref(), Some("BLOCKED"));
        assert!(!build.index.lookup_by_symbol("good").is_empty());
        assert!(!build.index.lookup_by_symbol("alsogood").is_empty());
        assert!(build.index.lookup_by_symbol("blocked").is_empty());
    }

    #[test]
    fn out_of_range_pivot_fails_only_its_row() {
        let rows = vec![
            row(2, "OK", d(2024, 1, 1)),
            row(3, "X", d(262142, 12, 1)),
        ];
        let build = ScriptDateIndex::build(&DateProjector::default(), rows);

        assert_eq!(build.projections.len(), 1);
        assert_eq!(build.projections[0].row.symbol, "OK");
        assert_eq!(build.failures.len(), 1);
        assert_eq!(build.failures[0].line, 3);
        assert!(matches!(build.failures[0].error, SwingError::DateOutOfRange { .. }));
        assert_eq!(build.index.lookup_by_symbol("ok").len(), 34);
    }
}
