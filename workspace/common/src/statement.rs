use chrono::NaiveDate;
use model::LedgerEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display order of a statement. Balances are always computed oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Older,
    Newer,
}

/// A ledger entry signed relative to a credit card.
///
/// Charges (money leaving through the card) are positive, payments against
/// the card are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEntry {
    pub entry: LedgerEntry,
    pub signed_amount: Decimal,
}

impl CycleEntry {
    pub fn is_charge(&self) -> bool {
        self.signed_amount > Decimal::ZERO
    }

    pub fn is_payment(&self) -> bool {
        self.signed_amount < Decimal::ZERO
    }
}

/// All entries of one day, with the running balance after they are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub entries: Vec<CycleEntry>,
    pub closing_balance: Decimal,
}

/// Payment state of a cycle, derived on every build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Paid,
    Overdue,
    PaymentPendingConfirmation,
    Open,
}

/// A credit card billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementCycle {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub close_date: NaiveDate,
    pub due_date: NaiveDate,
    pub sort_order: SortOrder,
    pub groups: Vec<DateGroup>,
    pub charges_total: Decimal,
    pub payments_total: Decimal,
    /// Always `charges_total - payments_total`.
    pub statement_balance: Decimal,
    pub status: CycleStatus,
}

impl StatementCycle {
    /// Entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &CycleEntry> {
        self.groups.iter().flat_map(|group| group.entries.iter())
    }

    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }
}
