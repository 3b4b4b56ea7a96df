//! Core domain types and logic.

pub mod calendar;
pub mod config_validation;
pub mod date_index;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod pivot;
pub mod projection;
pub mod query;
pub mod respect;
pub mod screen;
