//! CSV price file adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, holding daily bars as
//! `date,open,high,low,close[,volume]`. Coarser intervals are resampled
//! from the daily rows.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::{Interval, PriceBar, resample};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn price_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SwingError> {
    record
        .get(index)
        .ok_or_else(|| SwingError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| SwingError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, SwingError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| SwingError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result?;

            let date_str = record.get(0).ok_or_else(|| SwingError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                SwingError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: price_field(&record, 1, "open")?,
                high: price_field(&record, 2, "high")?,
                low: price_field(&record, 3, "low")?,
                close: price_field(&record, 4, "close")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(resample(&bars, interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-22,112.0,118.0,111.0,117.0,40000\n";
        fs::write(path.join("RELIANCE.csv"), csv_content).unwrap();
        fs::write(
            path.join("NOVOL.csv"),
            "date,open,high,low,close\n2024-01-15,1.0,2.0,0.5,1.5\n",
        )
        .unwrap();
        fs::write(
            path.join("BROKEN.csv"),
            "date,open,high,low,close\n2024-01-15,1.0,oops,0.5,1.5\n",
        )
        .unwrap();

        (dir, path)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fetch_returns_sorted_daily_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .fetch_bars("RELIANCE", d(2024, 1, 1), d(2024, 1, 31), Interval::Daily)
            .unwrap();

        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].date, d(2024, 1, 15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[3].date, d(2024, 1, 22));
    }

    #[test]
    fn fetch_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .fetch_bars("RELIANCE", d(2024, 1, 16), d(2024, 1, 16), Interval::Daily)
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 110.0);
    }

    #[test]
    fn fetch_resamples_weekly() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .fetch_bars("RELIANCE", d(2024, 1, 1), d(2024, 1, 31), Interval::Weekly)
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 120.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 115.0);
    }

    #[test]
    fn volume_column_is_optional() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .fetch_bars("NOVOL", d(2024, 1, 1), d(2024, 1, 31), Interval::Daily)
            .unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn missing_file_is_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_bars("XYZ", d(2024, 1, 1), d(2024, 1, 31), Interval::Daily);
        assert!(matches!(result, Err(SwingError::Data { .. })));
    }

    #[test]
    fn bad_price_is_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_bars("BROKEN", d(2024, 1, 1), d(2024, 1, 31), Interval::Daily);
        assert!(matches!(result, Err(SwingError::Data { reason }) if reason.contains("high")));
    }
}
