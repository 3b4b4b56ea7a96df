//! Continuous moving-average respect detection.
//!
//! A window is *respected* when no bar after the first trades entirely below
//! its simple moving average. Respected windows report how many bars
//! straddled the average (a *touch*).

use std::ops::Range;

use crate::domain::error::SwingError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_SMA_WINDOWS: [usize; 8] = [34, 50, 55, 89, 100, 144, 200, 233];

/// Bar 0 is never evaluated, so a second bar is the minimum.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespectResult {
    pub window: usize,
    pub touch_count: usize,
}

#[derive(Debug, Clone)]
pub struct MovingAverageAnalyzer {
    windows: Vec<usize>,
}

impl Default for MovingAverageAnalyzer {
    fn default() -> Self {
        Self {
            windows: DEFAULT_SMA_WINDOWS.to_vec(),
        }
    }
}

impl MovingAverageAnalyzer {
    pub fn new(windows: Vec<usize>) -> Result<Self, SwingError> {
        if windows.is_empty() {
            return Err(SwingError::ConfigInvalid {
                section: "analysis".into(),
                key: "windows".into(),
                reason: "at least one window is required".into(),
            });
        }
        if windows.contains(&0) {
            return Err(SwingError::ConfigInvalid {
                section: "analysis".into(),
                key: "windows".into(),
                reason: "windows must be positive".into(),
            });
        }
        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    /// Classify every configured window against `bars`, preserving window order.
    ///
    /// Only respected windows appear in the output, zero touches included.
    pub fn analyze(&self, bars: &[PriceBar]) -> Result<Vec<RespectResult>, SwingError> {
        if bars.len() < MIN_BARS {
            return Err(SwingError::InsufficientData {
                bars: bars.len(),
                minimum: MIN_BARS,
            });
        }

        let mut respected = Vec::new();
        for &window in &self.windows {
            let sma = calculate_sma(bars, window);
            if first_violation(bars, &sma).is_some() {
                continue;
            }
            respected.push(RespectResult {
                window,
                touch_count: count_touches(bars, &sma, 1..bars.len()),
            });
        }
        Ok(respected)
    }
}

/// Index of the first bar (from index 1) trading entirely below its average.
///
/// Bars without an average never violate.
pub fn first_violation(bars: &[PriceBar], sma: &IndicatorSeries) -> Option<usize> {
    (1..bars.len()).find(|&i| {
        sma.value_at(i)
            .is_some_and(|level| bars[i].entirely_below(level))
    })
}

/// Count bars in `range` whose low < average <= high.
///
/// Bars without an average never count.
pub fn count_touches(bars: &[PriceBar], sma: &IndicatorSeries, range: Range<usize>) -> usize {
    let end = range.end.min(bars.len());
    (range.start..end)
        .filter(|&i| sma.value_at(i).is_some_and(|level| bars[i].straddles(level)))
        .count()
}
