//! Price data access port.

use crate::domain::error::SwingError;
use crate::domain::ohlcv::{Interval, PriceBar};
use chrono::NaiveDate;

pub trait DataPort {
    /// Chronological bars for `symbol` within `[start_date, end_date]` at `interval`.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, SwingError>;
}
