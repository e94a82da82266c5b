use std::collections::BTreeMap;
use std::ops::AddAssign;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

/// Realized and planned totals for income and expenses.
///
/// Every field is a sum of absolute amounts, so all of them are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowTotals {
    pub realized_expenses: Decimal,
    pub planned_expenses: Decimal,
    pub realized_income: Decimal,
    pub planned_income: Decimal,
}

impl FlowTotals {
    pub fn total_expenses(&self) -> Decimal {
        self.realized_expenses + self.planned_expenses
    }

    pub fn total_income(&self) -> Decimal {
        self.realized_income + self.planned_income
    }

    /// Income minus expenses, realized and planned together.
    pub fn net(&self) -> Decimal {
        self.total_income() - self.total_expenses()
    }
}

impl AddAssign for FlowTotals {
    fn add_assign(&mut self, other: Self) {
        self.realized_expenses += other.realized_expenses;
        self.planned_expenses += other.planned_expenses;
        self.realized_income += other.realized_income;
        self.planned_income += other.planned_income;
    }
}

/// Totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: MonthKey,
    #[serde(flatten)]
    pub totals: FlowTotals,
}

/// Totals for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    #[serde(flatten)]
    pub totals: FlowTotals,
}

/// Half of a year: January-June or July-December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    H1,
    H2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterSummary {
    pub year: i32,
    pub semester: Semester,
    #[serde(flatten)]
    pub totals: FlowTotals,
}

/// One month of a comparison window: expense totals per selected category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMonth {
    pub month: MonthKey,
    pub by_category: BTreeMap<String, Decimal>,
}

impl WindowMonth {
    pub fn total(&self) -> Decimal {
        self.by_category.values().copied().sum()
    }
}

/// Trailing months ending with (and including) the anchor month, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonWindow {
    pub anchor: MonthKey,
    pub months: Vec<WindowMonth>,
}

impl ComparisonWindow {
    /// Sum over the whole window for one category.
    pub fn category_total(&self, category: &str) -> Decimal {
        self.months
            .iter()
            .filter_map(|month| month.by_category.get(category))
            .copied()
            .sum()
    }
}

/// One row of the category by month matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub label: String,
    pub months: [Decimal; 12],
}

impl MatrixRow {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            months: [Decimal::ZERO; 12],
        }
    }

    pub fn total(&self) -> Decimal {
        self.months.iter().copied().sum()
    }
}

/// A twelve-month category by month breakdown for one year.
///
/// `net_total` is the income subtotal minus the expense subtotal, month by month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatrix {
    pub year: i32,
    pub income_rows: Vec<MatrixRow>,
    pub income_subtotal: MatrixRow,
    pub expense_rows: Vec<MatrixRow>,
    pub expense_subtotal: MatrixRow,
    pub net_total: MatrixRow,
}

/// Figures that can be plotted by the custom metrics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Income,
    Expenses,
    Net,
    InvestmentBalance,
    InvestmentNetFlow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricLine {
    pub metric: MetricKind,
    /// One value per month of the series, aligned with [`MetricSeries::months`].
    pub values: Vec<Decimal>,
}

/// A selectable set of metrics over a window of months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub months: Vec<MonthKey>,
    pub lines: Vec<MetricLine>,
}

impl MetricSeries {
    pub fn line(&self, metric: MetricKind) -> Option<&MetricLine> {
        self.lines.iter().find(|line| line.metric == metric)
    }
}
