#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use swingcycle::domain::error::SwingError;
pub use swingcycle::domain::ohlcv::{Interval, PriceBar};
use swingcycle::domain::pivot::PivotRow;
use swingcycle::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, NaiveDate, NaiveDate, Interval)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, SwingError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), start_date, end_date, interval));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open,
        high,
        low,
        close,
    }
}

/// One bar per calendar day, each close `step` above the previous one,
/// with a one-point range either side of the close.
pub fn trending_bars(start: &str, count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
            }
        })
        .collect()
}

pub fn pivot(line: usize, symbol: &str, pivot: NaiveDate) -> Result<PivotRow, SwingError> {
    Ok(PivotRow {
        line,
        symbol: symbol.to_string(),
        pivot,
    })
}
