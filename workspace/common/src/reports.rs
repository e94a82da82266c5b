use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How to group an expense breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownBy {
    #[default]
    Category,
    Month,
}

/// Period size of an income versus expenses series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    #[default]
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub label: String,
    pub total: Decimal,
}

/// Expense totals for a date range, grouped by category or by month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub breakdown_by: BreakdownBy,
    /// Sorted by label.
    pub items: Vec<BreakdownItem>,
    pub total_expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFlow {
    /// `YYYY-MM-DD` for daily series, `YYYY-MM` for monthly ones.
    pub period: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

/// Income and expenses per period for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeVsExpenses {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub granularity: Granularity,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    /// Sorted by period.
    pub series: Vec<PeriodFlow>,
}
