//! Multi-symbol moving-average screen.
//!
//! Parses symbol lists from configuration, fetches each symbol with the
//! lookback widening applied, and runs the analyzer. One bad symbol is
//! skipped with a reason; the rest continue.

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::calendar::shift_days;
use crate::domain::error::SwingError;
use crate::domain::ohlcv::Interval;
use crate::domain::respect::{MovingAverageAnalyzer, RespectResult};
use crate::ports::data_port::DataPort;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Comma-separated symbols, trimmed and uppercased, in input order.
///
/// Empty tokens and repeats are skipped with a warning.
pub fn parse_symbols(input: &str) -> Vec<String> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for (position, token) in input.split(',').enumerate() {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            warn!(position, "skipping empty symbol");
            continue;
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            warn!(%symbol, "skipping duplicate symbol");
            continue;
        }
        symbols.push(symbol);
    }

    symbols
}

#[derive(Debug, Clone, Copy)]
pub struct ScreenRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interval: Interval,
    pub lookback_days: u32,
}

impl ScreenRequest {
    /// Start of the fetch window, widened so long averages are defined at `start_date`.
    pub fn fetch_start(&self) -> Result<NaiveDate, SwingError> {
        shift_days(self.start_date, -i64::from(self.lookback_days))
    }
}

#[derive(Debug, Clone)]
pub struct SymbolRespect {
    pub symbol: String,
    pub bars: usize,
    pub respected: Vec<RespectResult>,
}

#[derive(Debug)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SwingError,
}

#[derive(Debug, Default)]
pub struct ScreenReport {
    pub results: Vec<SymbolRespect>,
    pub skipped: Vec<SkippedSymbol>,
}

impl ScreenReport {
    /// Flattened `(symbol, window, touches)` rows in symbol then window order.
    pub fn rows(&self) -> Vec<(&str, usize, usize)> {
        self.results
            .iter()
            .flat_map(|r| {
                r.respected
                    .iter()
                    .map(move |res| (r.symbol.as_str(), res.window, res.touch_count))
            })
            .collect()
    }
}

pub fn screen_symbols(
    data_port: &dyn DataPort,
    analyzer: &MovingAverageAnalyzer,
    symbols: &[String],
    request: &ScreenRequest,
) -> ScreenReport {
    let mut report = ScreenReport::default();

    for symbol in symbols {
        let outcome = request
            .fetch_start()
            .and_then(|fetch_start| {
                info!(%symbol, from = %fetch_start, to = %request.end_date, interval = %request.interval, "analyzing");
                data_port.fetch_bars(symbol, fetch_start, request.end_date, request.interval)
            })
            .and_then(|bars| {
                if bars.is_empty() {
                    return Err(SwingError::NoData {
                        symbol: symbol.clone(),
                    });
                }
                let respected = analyzer.analyze(&bars)?;
                Ok((bars.len(), respected))
            });

        match outcome {
            Ok((bars, respected)) => {
                info!(%symbol, bars, respected = respected.len(), "done");
                report.results.push(SymbolRespect {
                    symbol: symbol.clone(),
                    bars,
                    respected,
                });
            }
            Err(reason) => {
                warn!(%symbol, %reason, "skipping symbol");
                report.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    if !report.skipped.is_empty() {
        warn!(
            analyzed = report.results.len(),
            total = symbols.len(),
            "some symbols were skipped"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbols_basic() {
        assert_eq!(parse_symbols("AAPL,MSFT"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn parse_symbols_trims_and_uppercases() {
        assert_eq!(
            parse_symbols(" aapl , msft "),
            vec!["AAPL", "MSFT"]
        );
    }

    #[test]
    fn parse_symbols_skips_empty_tokens() {
        assert_eq!(parse_symbols("AAPL,,MSFT,"), vec!["AAPL", "MSFT"]);
        assert!(parse_symbols(" , ").is_empty());
    }

    #[test]
    fn parse_symbols_keeps_first_of_duplicates() {
        assert_eq!(parse_symbols("AAPL,msft,aapl"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn fetch_start_widens_by_lookback() {
        let request = ScreenRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            interval: Interval::Daily,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        };
        assert_eq!(request.fetch_start().unwrap(), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn fetch_start_before_calendar_range_is_an_error() {
        let request = ScreenRequest {
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            interval: Interval::Daily,
            lookback_days: 1,
        };
        assert!(matches!(
            request.fetch_start(),
            Err(SwingError::DateOutOfRange { days: -1, .. })
        ));
    }
}
