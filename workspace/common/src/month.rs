use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month. `month` is 1-based, as chrono uses it.
///
/// Deserialization rejects months outside 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "MonthKeyParts")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
struct MonthKeyParts {
    year: i32,
    month: u32,
}

impl TryFrom<MonthKeyParts> for MonthKey {
    type Error = String;

    fn try_from(parts: MonthKeyParts) -> Result<Self, Self::Error> {
        MonthKey::new(parts.year, parts.month)
            .ok_or_else(|| format!("month {} is outside 1..=12", parts.month))
    }
}

impl MonthKey {
    /// Returns `None` unless `month` is within 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Zero-based position of the month within its year.
    ///
    /// A hand-built key with an out-of-range month is clamped into the year.
    pub fn index(&self) -> usize {
        (self.month.clamp(1, 12) - 1) as usize
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    /// Shifts by a signed number of months.
    pub fn offset(&self, months: i32) -> Self {
        let absolute = self.year * 12 + self.index() as i32 + months;
        Self {
            year: absolute.div_euclid(12),
            month: absolute.rem_euclid(12) as u32 + 1,
        }
    }

    /// The date in this month with the given day, clamped to the month's length.
    pub fn clamped_day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_else(|| self.last_day())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
