//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for swingcycle.
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("degree set is missing the {anchor} degree anchor; second cycle cannot be derived")]
    MissingAnchorDegree { anchor: u32 },

    #[error("invalid date '{input}', expected {expected}")]
    DateParse { input: String, expected: String },

    #[error("no trading day within {max_days} days after {from}; check the holiday list")]
    UnboundedAdvancement { from: NaiveDate, max_days: u32 },

    #[error("{from} shifted by {days} days is outside the supported date range")]
    DateOutOfRange { from: NaiveDate, days: i64 },

    #[error("pivot row {line}: {reason}")]
    PivotRow { line: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SwingError> for std::process::ExitCode {
    fn from(err: &SwingError) -> Self {
        let code: u8 = match err {
            SwingError::Io(_) => 1,
            SwingError::ConfigParse { .. }
            | SwingError::ConfigMissing { .. }
            | SwingError::ConfigInvalid { .. } => 2,
            SwingError::Data { .. }
            | SwingError::NoData { .. }
            | SwingError::PivotRow { .. }
            | SwingError::DateOutOfRange { .. }
            | SwingError::Csv(_) => 3,
            SwingError::DateParse { .. } => 4,
            SwingError::InsufficientData { .. } | SwingError::MissingAnchorDegree { .. } => 5,
            SwingError::UnboundedAdvancement { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
