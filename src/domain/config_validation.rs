//! Settings builders and validation.
//!
//! Every key is optional; absent keys take the compiled-in defaults.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::calendar::{HolidayCalendar, NSE_HOLIDAYS_2024};
use crate::domain::error::SwingError;
use crate::domain::ohlcv::Interval;
use crate::domain::projection::{
    ANCHOR_DEGREE, DEFAULT_DEGREES, DEFAULT_FACTOR, DEFAULT_MAX_ADVANCE_DAYS, DateProjector,
};
use crate::domain::respect::{DEFAULT_SMA_WINDOWS, MovingAverageAnalyzer};
use crate::domain::screen::DEFAULT_LOOKBACK_DAYS;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub data_dir: Option<PathBuf>,
    pub symbols: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub interval: Interval,
    pub windows: Vec<usize>,
    pub lookback_days: u32,
}

#[derive(Debug, Clone)]
pub struct ProjectionSettings {
    pub holidays: Vec<String>,
    pub degrees: Vec<u32>,
    pub factor: f64,
    pub max_advance_days: u32,
    pub pivots: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl AnalysisSettings {
    pub fn analyzer(&self) -> Result<MovingAverageAnalyzer, SwingError> {
        MovingAverageAnalyzer::new(self.windows.clone())
    }
}

impl ProjectionSettings {
    pub fn calendar(&self) -> Result<HolidayCalendar, SwingError> {
        HolidayCalendar::from_literals(self.holidays.as_slice()).map_err(|e| SwingError::ConfigInvalid {
            section: "calendar".into(),
            key: "holidays".into(),
            reason: e.to_string(),
        })
    }

    pub fn projector(&self) -> Result<DateProjector, SwingError> {
        DateProjector::new(
            self.calendar()?,
            self.degrees.clone(),
            self.factor,
            self.max_advance_days,
        )
    }
}

pub fn build_analysis_settings(config: &dyn ConfigPort) -> Result<AnalysisSettings, SwingError> {
    let start_date = optional_date(config, "analysis", "start_date")?;
    let end_date = optional_date(config, "analysis", "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        validate_date_order(start, end)?;
    }

    let interval = match config.get_string("analysis", "interval") {
        Some(s) => s.parse()?,
        None => Interval::Daily,
    };

    let windows = match config.get_list("analysis", "windows") {
        Some(items) => parse_positive_list::<usize>(&items, "analysis", "windows")?,
        None => DEFAULT_SMA_WINDOWS.to_vec(),
    };

    Ok(AnalysisSettings {
        data_dir: config.get_string("data", "dir").map(PathBuf::from),
        symbols: config.get_string("analysis", "symbols"),
        start_date,
        end_date,
        interval,
        windows,
        lookback_days: parse_value(
            config,
            "analysis",
            "lookback_days",
            DEFAULT_LOOKBACK_DAYS,
        )?,
    })
}

pub fn build_projection_settings(
    config: &dyn ConfigPort,
) -> Result<ProjectionSettings, SwingError> {
    let degrees = match config.get_list("projection", "degrees") {
        Some(items) => parse_positive_list::<u32>(&items, "projection", "degrees")?,
        None => DEFAULT_DEGREES.to_vec(),
    };
    if !degrees.contains(&ANCHOR_DEGREE) {
        return Err(SwingError::MissingAnchorDegree {
            anchor: ANCHOR_DEGREE,
        });
    }

    let factor = parse_value(config, "projection", "factor", DEFAULT_FACTOR)?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(SwingError::ConfigInvalid {
            section: "projection".into(),
            key: "factor".into(),
            reason: "factor must be positive".into(),
        });
    }

    let holidays = config
        .get_list("calendar", "holidays")
        .unwrap_or_else(|| NSE_HOLIDAYS_2024.iter().map(|s| s.to_string()).collect());

    let settings = ProjectionSettings {
        holidays,
        degrees,
        factor,
        max_advance_days: parse_value(
            config,
            "projection",
            "max_advance_days",
            DEFAULT_MAX_ADVANCE_DAYS,
        )?,
        pivots: config.get_string("projection", "pivots").map(PathBuf::from),
        output: config.get_string("projection", "output").map(PathBuf::from),
    };
    settings.calendar()?;
    Ok(settings)
}

pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), SwingError> {
    if start >= end {
        return Err(SwingError::ConfigInvalid {
            section: "analysis".into(),
            key: "start_date".into(),
            reason: "start_date must be before end_date".into(),
        });
    }
    Ok(())
}

pub fn parse_iso_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, SwingError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| SwingError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {key} format, expected YYYY-MM-DD"),
    })
}

fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, SwingError> {
    config
        .get_string(section, key)
        .map(|s| parse_iso_date(&s, section, key))
        .transpose()
}

/// `default` only when the key is absent; a present value must parse.
fn parse_value<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, SwingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    raw.trim().parse().map_err(|e: T::Err| SwingError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("'{}': {e}", raw.trim()),
    })
}

fn parse_positive_list<T>(items: &[String], section: &str, key: &str) -> Result<Vec<T>, SwingError>
where
    T: FromStr + PartialEq + Default,
{
    if items.is_empty() {
        return Err(SwingError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must not be empty"),
        });
    }
    items
        .iter()
        .map(|item| match item.parse::<T>() {
            Ok(v) if v != T::default() => Ok(v),
            _ => Err(SwingError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{item}' is not a positive integer"),
            }),
        })
        .collect()
}
