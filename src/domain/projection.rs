//! Degree-based future date projection.
//!
//! Each degree `d` maps to `seed + floor(d * factor)` days, pushed forward
//! to the next trading day. The second cycle is seeded by the first cycle's
//! 360 degree date.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::calendar::{HolidayCalendar, shift_days};
use crate::domain::error::SwingError;

pub const DEFAULT_DEGREES: [u32; 17] = [
    30, 45, 60, 72, 90, 120, 135, 150, 180, 210, 225, 240, 270, 300, 315, 330, 360,
];
pub const DEFAULT_FACTOR: f64 = 1.0146;
pub const ANCHOR_DEGREE: u32 = 360;
pub const DEFAULT_MAX_ADVANCE_DAYS: u32 = 30;

/// A degree tagged with the cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DegreeKey {
    CycleOne(u32),
    CycleTwo(u32),
}

impl DegreeKey {
    pub fn degree(&self) -> u32 {
        match self {
            DegreeKey::CycleOne(d) | DegreeKey::CycleTwo(d) => *d,
        }
    }

    /// Column header used by the tabular export.
    pub fn column_name(&self) -> String {
        match self {
            DegreeKey::CycleOne(d) => format!("Degree_{d}_Date"),
            DegreeKey::CycleTwo(d) => format!("Degree_{d}_Second_Cycle_Date"),
        }
    }
}

/// First-cycle keys render as the bare degree, second-cycle keys as their label.
impl fmt::Display for DegreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreeKey::CycleOne(d) => write!(f, "{d}"),
            DegreeKey::CycleTwo(d) => write!(f, "Degree_{d}_Second_Cycle_Date"),
        }
    }
}

/// Projected dates of one cycle, in degree order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleResult {
    pub entries: Vec<(DegreeKey, NaiveDate)>,
}

impl CycleResult {
    pub fn get(&self, key: DegreeKey) -> Option<NaiveDate> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, date)| *date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoCycleProjection {
    pub cycle_one: CycleResult,
    pub cycle_two: CycleResult,
}

impl TwoCycleProjection {
    /// Both cycles' entries, cycle one first.
    pub fn iter(&self) -> impl Iterator<Item = &(DegreeKey, NaiveDate)> {
        self.cycle_one.entries.iter().chain(&self.cycle_two.entries)
    }
}

#[derive(Debug, Clone)]
pub struct DateProjector {
    calendar: HolidayCalendar,
    degrees: Vec<u32>,
    factor: f64,
    max_advance_days: u32,
}

impl Default for DateProjector {
    fn default() -> Self {
        Self {
            calendar: HolidayCalendar::default(),
            degrees: DEFAULT_DEGREES.to_vec(),
            factor: DEFAULT_FACTOR,
            max_advance_days: DEFAULT_MAX_ADVANCE_DAYS,
        }
    }
}

impl DateProjector {
    pub fn new(
        calendar: HolidayCalendar,
        degrees: Vec<u32>,
        factor: f64,
        max_advance_days: u32,
    ) -> Result<Self, SwingError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(SwingError::ConfigInvalid {
                section: "projection".into(),
                key: "factor".into(),
                reason: "factor must be a positive number".into(),
            });
        }
        if degrees.contains(&0) {
            return Err(SwingError::ConfigInvalid {
                section: "projection".into(),
                key: "degrees".into(),
                reason: "degrees must be positive".into(),
            });
        }
        Ok(Self {
            calendar,
            degrees,
            factor,
            max_advance_days,
        })
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    pub fn degrees(&self) -> &[u32] {
        &self.degrees
    }

    /// Whole days added for `degree`; the fractional part is dropped.
    pub fn offset_days(&self, degree: u32) -> i64 {
        (degree as f64 * self.factor).floor() as i64
    }

    pub fn project_date(&self, seed: NaiveDate, degree: u32) -> Result<NaiveDate, SwingError> {
        let candidate = shift_days(seed, self.offset_days(degree))?;
        self.calendar
            .advance_to_trading_day(candidate, self.max_advance_days)
    }

    pub fn project_cycle_one(&self, seed: NaiveDate) -> Result<CycleResult, SwingError> {
        if !self.degrees.contains(&ANCHOR_DEGREE) {
            return Err(SwingError::MissingAnchorDegree {
                anchor: ANCHOR_DEGREE,
            });
        }
        self.project_cycle(seed, DegreeKey::CycleOne)
    }

    /// `seed` is the first cycle's 360 degree date.
    pub fn project_cycle_two(&self, seed: NaiveDate) -> Result<CycleResult, SwingError> {
        self.project_cycle(seed, DegreeKey::CycleTwo)
    }

    /// Project cycle one from `pivot`, then cycle two from its 360 degree date.
    pub fn project_cycles(&self, pivot: NaiveDate) -> Result<TwoCycleProjection, SwingError> {
        let cycle_one = self.project_cycle_one(pivot)?;
        let anchor = cycle_one
            .get(DegreeKey::CycleOne(ANCHOR_DEGREE))
            .ok_or(SwingError::MissingAnchorDegree {
                anchor: ANCHOR_DEGREE,
            })?;
        let cycle_two = self.project_cycle_two(anchor)?;
        Ok(TwoCycleProjection {
            cycle_one,
            cycle_two,
        })
    }

    fn project_cycle(
        &self,
        seed: NaiveDate,
        key: fn(u32) -> DegreeKey,
    ) -> Result<CycleResult, SwingError> {
        let entries = self
            .degrees
            .iter()
            .map(|&degree| Ok((key(degree), self.project_date(seed, degree)?)))
            .collect::<Result<Vec<_>, SwingError>>()?;
        Ok(CycleResult { entries })
    }
}
