use chrono::NaiveDate;
use model::PaymentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A not-yet-persisted occurrence produced by expanding a recurring payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceDraft {
    pub payment_id: i32,
    pub scheduled_date: NaiveDate,
    /// Equal to the scheduled date unless a `change_date` override moves it.
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: PaymentStatus,
}
