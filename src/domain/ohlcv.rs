//! Price bar representation and interval resampling.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::SwingError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// True when open, high, low and close all sit strictly below `level`.
    pub fn entirely_below(&self, level: f64) -> bool {
        self.open < level && self.high < level && self.low < level && self.close < level
    }

    /// low < level <= high
    pub fn straddles(&self, level: f64) -> bool {
        self.low < level && level <= self.high
    }
}

/// Candle timeframe requested from the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => write!(f, "1d"),
            Interval::Weekly => write!(f, "1wk"),
            Interval::Monthly => write!(f, "1mo"),
        }
    }
}

impl FromStr for Interval {
    type Err = SwingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            other => Err(SwingError::ConfigInvalid {
                section: "analysis".into(),
                key: "interval".into(),
                reason: format!("unknown interval '{other}', expected 1d, 1wk or 1mo"),
            }),
        }
    }
}

impl Interval {
    fn bucket(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            Interval::Daily => (date.year(), date.ordinal()),
            Interval::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Interval::Monthly => (date.year(), date.month()),
        }
    }
}

/// Aggregate chronologically ordered daily bars into `interval` candles.
///
/// Each candle takes the first open, highest high, lowest low and last close
/// of its bucket and is dated at the first daily bar it contains.
pub fn resample(bars: &[PriceBar], interval: Interval) -> Vec<PriceBar> {
    if interval == Interval::Daily {
        return bars.to_vec();
    }

    let mut out: Vec<PriceBar> = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;

    for bar in bars {
        let key = interval.bucket(bar.date);
        match out.last_mut() {
            Some(last) if current_key == Some(key) => {
                last.high = last.high.max(bar.high);
                last.low = last.low.min(bar.low);
                last.close = bar.close;
            }
            _ => {
                out.push(bar.clone());
                current_key = Some(key);
            }
        }
    }

    out
}
