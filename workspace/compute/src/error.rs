use chrono::NaiveDate;
use thiserror::Error;

/// Error types for the compute module.
///
/// Only caller misuse is reported here. Bad data in a snapshot is coerced and
/// counted, never raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// Comparison windows span 3, 6, 9 or 12 months
    #[error("Invalid comparison window: {0} months (expected 3, 6, 9 or 12)")]
    InvalidWindow(usize),

    /// Month numbers are 1-based
    #[error("Invalid month: {0} (expected 1 to 12)")]
    InvalidMonth(u32),

    /// Cycle or report bounds where the start comes after the end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Statement close days run from 1 to 31
    #[error("Invalid statement close day: {0} (expected 1 to 31)")]
    InvalidCloseDay(u32),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
