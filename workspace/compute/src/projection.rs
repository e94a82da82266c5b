use chrono::NaiveDate;
use common::MonthKey;
use model::{LedgerEntry, PaymentStatus};

/// How an included entry counts toward a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Realized,
    Projected,
}

/// Decides which entries count toward which months.
///
/// Realized entries count for every month. Planned entries count only for
/// months strictly after the month containing `now`, so a stale projection
/// never populates history. Every other status is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionPolicy {
    now: NaiveDate,
    current_month: MonthKey,
}

impl ProjectionPolicy {
    pub fn new(now: NaiveDate) -> Self {
        Self {
            now,
            current_month: MonthKey::from_date(now),
        }
    }

    pub fn now(&self) -> NaiveDate {
        self.now
    }

    pub fn current_month(&self) -> MonthKey {
        self.current_month
    }

    /// Classifies a status for the target month, or `None` when it is excluded.
    pub fn classify(&self, status: PaymentStatus, month: MonthKey) -> Option<Projection> {
        if status.is_realized() {
            Some(Projection::Realized)
        } else if status.is_planned() && month > self.current_month {
            Some(Projection::Projected)
        } else {
            None
        }
    }

    /// Whether the entry counts toward `month` (1-based) of `year`.
    ///
    /// Only the status is consulted; callers bucket entries by their own date.
    /// An out-of-range month includes nothing.
    pub fn include_for_month(&self, entry: &LedgerEntry, year: i32, month: u32) -> bool {
        MonthKey::new(year, month)
            .is_some_and(|month| self.classify(entry.status, month).is_some())
    }
}
