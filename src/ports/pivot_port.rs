//! Pivot table source and projection result sink ports.

use crate::domain::date_index::RowProjection;
use crate::domain::error::SwingError;
use crate::domain::pivot::PivotRow;

pub trait PivotSource {
    /// One entry per data row in table order. A malformed row is an `Err`
    /// entry; the outer error is reserved for an unreadable table.
    fn read_rows(&self) -> Result<Vec<Result<PivotRow, SwingError>>, SwingError>;
}

pub trait ProjectionSink {
    /// Persist each row with its projected dates appended as columns.
    fn write(&self, projections: &[RowProjection], degrees: &[u32]) -> Result<(), SwingError>;
}
