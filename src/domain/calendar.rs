//! Trading-day calendar: weekends plus a fixed holiday list.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;

use crate::domain::error::SwingError;

/// `date` moved by `days`, failing instead of overflowing chrono's range.
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, SwingError> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(SwingError::DateOutOfRange { from: date, days })
}

/// `dd-mm-yyyy`, used for holiday literals, index buckets and queries.
pub const DAY_MONTH_YEAR: &str = "%d-%m-%Y";

/// NSE trading holidays, 2024.
pub const NSE_HOLIDAYS_2024: [&str; 16] = [
    "22-01-2024",
    "26-01-2024",
    "08-03-2024",
    "25-03-2024",
    "29-03-2024",
    "11-04-2024",
    "17-04-2024",
    "01-05-2024",
    "20-05-2024",
    "17-06-2024",
    "17-07-2024",
    "15-08-2024",
    "02-10-2024",
    "01-11-2024",
    "15-11-2024",
    "25-12-2024",
];

pub fn parse_day_month_year(input: &str) -> Result<NaiveDate, SwingError> {
    NaiveDate::parse_from_str(input.trim(), DAY_MONTH_YEAR).map_err(|_| SwingError::DateParse {
        input: input.to_string(),
        expected: "dd-mm-yyyy".into(),
    })
}

pub fn format_day_month_year(date: NaiveDate) -> String {
    date.format(DAY_MONTH_YEAR).to_string()
}

/// Immutable set of explicit non-trading dates. Saturdays and Sundays are
/// always non-trading.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        let holidays = NSE_HOLIDAYS_2024
            .iter()
            .filter_map(|s| NaiveDate::parse_from_str(s, DAY_MONTH_YEAR).ok())
            .collect();
        Self { holidays }
    }
}

impl HolidayCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(holidays: I) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Build from `dd-mm-yyyy` literals; any malformed literal fails the whole set.
    pub fn from_literals<S: AsRef<str>>(literals: &[S]) -> Result<Self, SwingError> {
        let holidays = literals
            .iter()
            .map(|s| parse_day_month_year(s.as_ref()))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(Self { holidays })
    }

    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_non_trading_day(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || self.is_holiday(date)
    }

    /// Step forward one day at a time from `date` until a trading day.
    ///
    /// Returns `date` itself when it already trades. Fails once more than
    /// `max_days` steps would be needed.
    pub fn advance_to_trading_day(
        &self,
        date: NaiveDate,
        max_days: u32,
    ) -> Result<NaiveDate, SwingError> {
        let mut candidate = date;
        let mut steps = 0u32;
        while self.is_non_trading_day(candidate) {
            if steps == max_days {
                return Err(SwingError::UnboundedAdvancement {
                    from: date,
                    max_days,
                });
            }
            candidate = shift_days(candidate, 1)?;
            steps += 1;
        }
        Ok(candidate)
    }
}
