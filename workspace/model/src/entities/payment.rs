use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::account::{AccountKind, AccountRef};
use crate::lenient::RawAmount;

/// Lifecycle status shared by payments and occurrences.
///
/// The string values are a contract with the data store and must stay verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Scheduled,
    Processed,
    Failed,
    Cancelled,
    Reconciled,
    /// Any status string the data store sends that is not part of the vocabulary.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Returns true if the transaction has actually happened.
    pub fn is_realized(self) -> bool {
        matches!(self, PaymentStatus::Processed | PaymentStatus::Reconciled)
    }

    /// Returns true if the transaction is expected but has not happened yet.
    pub fn is_planned(self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Scheduled)
    }

    /// Returns true for statuses that reports skip entirely.
    pub fn is_ignored_in_reports(self) -> bool {
        matches!(
            self,
            PaymentStatus::Cancelled | PaymentStatus::Failed | PaymentStatus::Unknown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Scheduled => "scheduled",
            PaymentStatus::Processed => "processed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Reconciled => "reconciled",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a payment is a single entry or a recurring series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    OneTime,
    Recurring,
}

/// Enum for recurrence frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// A transaction template as stored by the backend.
///
/// One-time payments carry their own `due_date`. Recurring payments carry a
/// rule (`frequency`, `start_date`, `end_date`) and are realized through
/// [`super::Occurrence`] rows fetched separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayment {
    pub id: i32,
    #[serde(default)]
    pub description: String,
    /// The amount as sent. Missing or non-numeric amounts normalize to zero.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Free-form category reference: a category name or a literal type.
    #[serde(default)]
    pub category: Option<String>,
    /// Reference to a category metadata record.
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub from_account_type: Option<AccountKind>,
    #[serde(default)]
    pub from_account_id: Option<i32>,
    #[serde(default)]
    pub to_account_type: Option<AccountKind>,
    #[serde(default)]
    pub to_account_id: Option<i32>,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub status: PaymentStatus,
    /// When a one-time payment is due.
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub frequency: Option<PaymentFrequency>,
    /// The date of the first occurrence of a recurring payment.
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub start_date: Option<NaiveDate>,
    /// The date of the last occurrence. If null, it repeats indefinitely.
    #[serde(default, with = "crate::lenient::calendar_date")]
    pub end_date: Option<NaiveDate>,
    /// May embed a child category tag such as `[subcategory:Groceries]`.
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_active() -> bool {
    true
}

impl RawPayment {
    /// Creates a one-time payment with the given amount and due date.
    pub fn one_time(id: i32, description: &str, amount: RawAmount, due_date: NaiveDate) -> Self {
        Self {
            id,
            description: description.to_string(),
            amount: Some(amount),
            currency: default_currency(),
            category: None,
            category_id: None,
            from_account_type: None,
            from_account_id: None,
            to_account_type: None,
            to_account_id: None,
            payment_type: PaymentType::OneTime,
            status: PaymentStatus::Pending,
            due_date: Some(due_date),
            frequency: None,
            start_date: None,
            end_date: None,
            notes: None,
            tag_ids: Vec::new(),
            is_active: true,
        }
    }

    /// Creates a recurring payment starting on `start_date`.
    pub fn recurring(
        id: i32,
        description: &str,
        amount: RawAmount,
        frequency: PaymentFrequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            payment_type: PaymentType::Recurring,
            due_date: None,
            frequency: Some(frequency),
            start_date: Some(start_date),
            ..Self::one_time(id, description, amount, start_date)
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.payment_type == PaymentType::Recurring
    }

    /// The source account, if the payment names one.
    pub fn from_account(&self) -> Option<AccountRef> {
        self.from_account_type
            .map(|kind| AccountRef::new(kind, self.from_account_id))
    }

    /// The destination account, if the payment names one.
    pub fn to_account(&self) -> Option<AccountRef> {
        self.to_account_type
            .map(|kind| AccountRef::new(kind, self.to_account_id))
    }

    /// Sets the source account.
    pub fn with_from_account(mut self, kind: AccountKind, id: i32) -> Self {
        self.from_account_type = Some(kind);
        self.from_account_id = Some(id);
        self
    }

    /// Sets the destination account.
    pub fn with_to_account(mut self, kind: AccountKind, id: i32) -> Self {
        self.to_account_type = Some(kind);
        self.to_account_id = Some(id);
        self
    }

    /// Sets the free-form category reference.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Sets the payment status.
    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_vocabulary_is_verbatim() {
        let statuses: Vec<PaymentStatus> =
            serde_json::from_str(r#"["pending","scheduled","processed","reconciled","cancelled","failed","bogus"]"#)
                .unwrap();

        assert_eq!(
            statuses,
            vec![
                PaymentStatus::Pending,
                PaymentStatus::Scheduled,
                PaymentStatus::Processed,
                PaymentStatus::Reconciled,
                PaymentStatus::Cancelled,
                PaymentStatus::Failed,
                PaymentStatus::Unknown,
            ]
        );
        assert!(PaymentStatus::Reconciled.is_realized());
        assert!(PaymentStatus::Scheduled.is_planned());
        assert!(!PaymentStatus::Failed.is_realized());
        assert!(!PaymentStatus::Failed.is_planned());
    }

    #[test]
    fn test_deserialize_payment_with_defaults() {
        let json = r#"{
            "id": 7,
            "description": "Rent",
            "amount": "1500.00",
            "category": "Housing",
            "from_account_type": "bank_account",
            "from_account_id": 3,
            "payment_type": "recurring",
            "status": "scheduled",
            "frequency": "monthly",
            "start_date": "2026-01-01T00:00:00Z"
        }"#;

        let payment: RawPayment = serde_json::from_str(json).unwrap();

        assert_eq!(payment.currency, "USD");
        assert!(payment.is_recurring());
        assert!(payment.is_active);
        assert_eq!(payment.start_date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(
            payment.amount.as_ref().and_then(RawAmount::to_decimal),
            Some(Decimal::new(150000, 2))
        );
        assert_eq!(
            payment.from_account(),
            Some(AccountRef::new(AccountKind::BankAccount, Some(3)))
        );
        assert_eq!(payment.to_account(), None);
    }

    #[test]
    fn test_wrongly_typed_fields_degrade_to_missing() {
        let json = r#"[
            { "id": 1, "amount": true, "due_date": "2026-01-05" },
            { "id": 2, "amount": 1e40, "due_date": 20260105 },
            { "id": 3, "amount": "12.00", "start_date": false, "end_date": ["2026-01-01"] }
        ]"#;

        let payments: Vec<RawPayment> = serde_json::from_str(json).unwrap();

        assert_eq!(payments[0].amount, Some(RawAmount::Malformed));
        assert_eq!(payments[0].due_date, NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(payments[1].amount.as_ref().and_then(RawAmount::to_decimal), None);
        assert_eq!(payments[1].due_date, None);
        assert_eq!(payments[2].start_date, None);
        assert_eq!(payments[2].end_date, None);
    }
}
