use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::entities::{AccountKind, AccountRef, CategoryType, PaymentStatus};

/// Synthetic identifier of a ledger entry.
///
/// Displays as `p-<paymentId>` for one-time payments and
/// `o-<paymentId>-<occurrenceId>` for expanded occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryId {
    Payment(i32),
    Occurrence { payment_id: i32, occurrence_id: i32 },
}

impl EntryId {
    pub fn payment_id(&self) -> i32 {
        match self {
            EntryId::Payment(id) => *id,
            EntryId::Occurrence { payment_id, .. } => *payment_id,
        }
    }

    pub fn occurrence_id(&self) -> Option<i32> {
        match self {
            EntryId::Payment(_) => None,
            EntryId::Occurrence { occurrence_id, .. } => Some(*occurrence_id),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Payment(id) => write!(f, "p-{}", id),
            EntryId::Occurrence {
                payment_id,
                occurrence_id,
            } => write!(f, "o-{}-{}", payment_id, occurrence_id),
        }
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let invalid = || serde::de::Error::custom(format!("invalid ledger entry id: {}", raw));
        let mut parts = raw.split('-');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("p"), Some(payment), None, None) => {
                Ok(EntryId::Payment(payment.parse().map_err(|_| invalid())?))
            }
            (Some("o"), Some(payment), Some(occurrence), None) => Ok(EntryId::Occurrence {
                payment_id: payment.parse().map_err(|_| invalid())?,
                occurrence_id: occurrence.parse().map_err(|_| invalid())?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// A normalized, dated unit of the ledger.
///
/// Entries are derived from payments and occurrences on every load and are
/// never persisted. The amount keeps the sign the data store used; consumers
/// that need a direction take the absolute value or consult the account
/// linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub description: String,
    /// Calendar date of the entry. `None` when the source date was missing or unparseable.
    pub due_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub category_name: String,
    pub category_type: CategoryType,
    /// Child category tag extracted from the notes, if any.
    pub subcategory: Option<String>,
    pub from_account: Option<AccountRef>,
    pub to_account: Option<AccountRef>,
    pub tag_ids: Vec<i32>,
}

impl LedgerEntry {
    /// Creates an entry with no account linkage or tags.
    pub fn new(
        id: EntryId,
        due_date: Option<NaiveDate>,
        amount: Decimal,
        status: PaymentStatus,
        category_name: &str,
        category_type: CategoryType,
    ) -> Self {
        Self {
            id,
            description: String::new(),
            due_date,
            amount,
            currency: "USD".to_string(),
            status,
            category_name: category_name.to_string(),
            category_type,
            subcategory: None,
            from_account: None,
            to_account: None,
            tag_ids: Vec::new(),
        }
    }

    pub fn with_from_account(mut self, kind: AccountKind, id: i32) -> Self {
        self.from_account = Some(AccountRef::new(kind, Some(id)));
        self
    }

    pub fn with_to_account(mut self, kind: AccountKind, id: i32) -> Self {
        self.to_account = Some(AccountRef::new(kind, Some(id)));
        self
    }

    /// The absolute value of the amount.
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    /// Returns true if the entry is dated within `[start, end]`.
    pub fn is_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.due_date.is_some_and(|date| date >= start && date <= end)
    }

    /// Returns true if money leaves the given account.
    pub fn is_from(&self, kind: AccountKind, id: i32) -> bool {
        self.from_account.is_some_and(|account| account.is(kind, id))
    }

    /// Returns true if money enters the given account.
    pub fn is_to(&self, kind: AccountKind, id: i32) -> bool {
        self.to_account.is_some_and(|account| account.is(kind, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_display_and_roundtrip() {
        let one_time = EntryId::Payment(12);
        let occurrence = EntryId::Occurrence {
            payment_id: 4,
            occurrence_id: 31,
        };

        assert_eq!(one_time.to_string(), "p-12");
        assert_eq!(occurrence.to_string(), "o-4-31");
        assert_eq!(occurrence.payment_id(), 4);
        assert_eq!(occurrence.occurrence_id(), Some(31));

        let parsed: EntryId = serde_json::from_str("\"o-4-31\"").unwrap();
        assert_eq!(parsed, occurrence);
        assert!(serde_json::from_str::<EntryId>("\"x-1\"").is_err());
    }

    #[test]
    fn test_month_and_range_checks() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let entry = LedgerEntry::new(
            EntryId::Payment(1),
            Some(date),
            Decimal::new(-5000, 2), // -50.00
            PaymentStatus::Scheduled,
            "Food",
            CategoryType::Expense,
        );
        let undated = LedgerEntry {
            due_date: None,
            ..entry.clone()
        };

        assert!(entry.is_between(date, date));
        assert!(!entry.is_between(date.succ_opt().unwrap(), NaiveDate::MAX));
        assert_eq!(entry.magnitude(), Decimal::new(5000, 2));
        assert!(!undated.is_between(NaiveDate::MIN, NaiveDate::MAX));
    }

    #[test]
    fn test_account_direction() {
        let entry = LedgerEntry::new(
            EntryId::Payment(1),
            None,
            Decimal::ONE,
            PaymentStatus::Processed,
            "Card payment",
            CategoryType::Transfer,
        )
        .with_from_account(AccountKind::BankAccount, 1)
        .with_to_account(AccountKind::CreditCard, 9);

        assert!(entry.is_from(AccountKind::BankAccount, 1));
        assert!(entry.is_to(AccountKind::CreditCard, 9));
        assert!(!entry.is_to(AccountKind::CreditCard, 8));
    }
}
