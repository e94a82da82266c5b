use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What an override does to the occurrences it affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Skip,
    ChangeAmount,
    ChangeDate,
    Cancel,
}

/// A rule that alters generated occurrences of a recurring payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPaymentOverride {
    pub id: i32,
    pub payment_id: i32,
    pub override_type: OverrideKind,
    /// A single occurrence date to affect. If null, every date in the window is affected.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// When the override takes effect.
    pub effective_date: NaiveDate,
    /// When the override ends. If null, it applies to all future occurrences.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub new_amount: Option<Decimal>,
    #[serde(default)]
    pub new_due_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RecurringPaymentOverride {
    /// Returns true if the given occurrence date falls under this override.
    pub fn affects(&self, date: NaiveDate) -> bool {
        if date < self.effective_date {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        match self.target_date {
            Some(target) => date == target,
            None => true,
        }
    }
}
