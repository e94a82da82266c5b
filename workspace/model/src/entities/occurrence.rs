use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::payment::PaymentStatus;
use crate::lenient::RawAmount;

/// One scheduled instance of a recurring payment.
///
/// Occurrences are individually mutable: status, date and amount can diverge
/// from the parent series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: i32,
    /// The payment that generated this occurrence.
    pub payment_id: i32,
    /// The date this occurrence is scheduled for.
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub due_date: Option<NaiveDate>,
    /// Overrides the parent's amount when present.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default = "default_status")]
    pub status: PaymentStatus,
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub processed_date: Option<NaiveDate>,
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub reconciled_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_status() -> PaymentStatus {
    PaymentStatus::Scheduled
}

impl Occurrence {
    /// Creates a scheduled occurrence for the given date.
    pub fn new(id: i32, payment_id: i32, scheduled_date: NaiveDate) -> Self {
        Self {
            id,
            payment_id,
            scheduled_date: Some(scheduled_date),
            due_date: None,
            amount: None,
            status: default_status(),
            processed_date: None,
            reconciled_date: None,
            notes: None,
        }
    }

    /// The calendar date used for bucketing: the scheduled date, else the due date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.scheduled_date.or(self.due_date)
    }

    pub fn with_amount(mut self, amount: RawAmount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }
}
