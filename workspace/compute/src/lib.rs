//! Ledger aggregation engine.
//!
//! Everything here is a pure, synchronous transformation over collections the
//! caller has already fetched. Snapshots flow one way, from raw payments and
//! occurrences through [`normalizer::normalize`] into the aggregator,
//! statement builder and growth accumulator. The mutation planner is the only
//! path back toward storage, and it only describes operations.

pub mod aggregator;
pub mod balances;
pub mod classifier;
pub mod error;
pub mod growth;
pub mod normalizer;
pub mod planner;
pub mod projection;
pub mod recurrence;
pub mod reports;
pub mod statement;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{NaiveDate, Utc};

pub use classifier::{Classification, classify};
pub use error::{ComputeError, Result};
pub use normalizer::{NormalizedLedger, normalize};
pub use planner::plan_mutation;
pub use projection::{Projection, ProjectionPolicy};
pub use statement::{CycleBounds, StatementSchedule};

/// Returns the projection policy evaluated at `today`, or at the current date if none is provided.
pub fn default_policy(today: Option<NaiveDate>) -> ProjectionPolicy {
    ProjectionPolicy::new(today.unwrap_or_else(|| Utc::now().date_naive()))
}
