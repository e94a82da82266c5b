//! Folds ledger entries into month, year and semester totals, comparison
//! windows, the category matrix and custom metric series.
//!
//! Every view goes through the same per-entry step: bucket the entry by its
//! own month, ask the [`ProjectionPolicy`] whether it counts for that month,
//! and add its absolute amount. Expenses pass through the category selection;
//! income is never filtered.

use std::collections::BTreeMap;

use common::{
    CategoryMatrix, ComparisonWindow, FlowTotals, GrowthSeries, MatrixRow, MetricKind,
    MetricLine, MetricSeries, MonthKey, MonthSummary, Semester, SemesterSummary, WindowMonth,
    YearSummary,
};
use model::{CategoryType, LedgerEntry, Selection};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::projection::{Projection, ProjectionPolicy};

/// Number of trailing months in a comparison window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize(usize);

impl WindowSize {
    pub const ALLOWED: [usize; 4] = [3, 6, 9, 12];

    pub fn new(months: usize) -> Result<Self> {
        if Self::ALLOWED.contains(&months) {
            Ok(Self(months))
        } else {
            Err(ComputeError::InvalidWindow(months))
        }
    }

    pub fn months(&self) -> usize {
        self.0
    }

    /// The window's months ending with `anchor`, oldest first.
    pub fn months_ending(&self, anchor: MonthKey) -> Vec<MonthKey> {
        (0..self.0 as i32)
            .rev()
            .map(|back| anchor.offset(-back))
            .collect()
    }
}

/// An entry that counts toward its own month.
struct Counted<'a> {
    entry: &'a LedgerEntry,
    month: MonthKey,
    projection: Projection,
}

fn count_entry<'a>(
    entry: &'a LedgerEntry,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> Option<Counted<'a>> {
    let month = MonthKey::from_date(entry.due_date?);
    match entry.category_type {
        CategoryType::Transfer => return None,
        CategoryType::Expense if !selection.contains_name(&entry.category_name) => return None,
        _ => {}
    }
    let projection = policy.classify(entry.status, month)?;
    Some(Counted {
        entry,
        month,
        projection,
    })
}

fn add_to(totals: &mut FlowTotals, counted: &Counted<'_>) {
    let amount = counted.entry.magnitude();
    match (counted.entry.category_type, counted.projection) {
        (CategoryType::Expense, Projection::Realized) => totals.realized_expenses += amount,
        (CategoryType::Expense, Projection::Projected) => totals.planned_expenses += amount,
        (CategoryType::Income, Projection::Realized) => totals.realized_income += amount,
        (CategoryType::Income, Projection::Projected) => totals.planned_income += amount,
        (CategoryType::Transfer, _) => {}
    }
}

/// Twelve month buckets for `year`, January first.
#[instrument(skip(entries, selection, policy), fields(entries = entries.len()))]
pub fn build_month_summary(
    entries: &[LedgerEntry],
    year: i32,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> [MonthSummary; 12] {
    let mut months: [MonthSummary; 12] = std::array::from_fn(|index| MonthSummary {
        month: MonthKey {
            year,
            month: index as u32 + 1,
        },
        totals: FlowTotals::default(),
    });

    for counted in entries
        .iter()
        .filter_map(|entry| count_entry(entry, selection, policy))
        .filter(|counted| counted.month.year == year)
    {
        add_to(&mut months[counted.month.index()].totals, &counted);
    }

    months
}

/// Per-year totals for every year in `[from_year, to_year]`. Empty when the range is inverted.
#[instrument(skip(entries, selection, policy), fields(entries = entries.len()))]
pub fn yearly_totals(
    entries: &[LedgerEntry],
    from_year: i32,
    to_year: i32,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> Vec<YearSummary> {
    let mut years: BTreeMap<i32, FlowTotals> = (from_year..=to_year)
        .map(|year| (year, FlowTotals::default()))
        .collect();

    for counted in entries
        .iter()
        .filter_map(|entry| count_entry(entry, selection, policy))
    {
        if let Some(totals) = years.get_mut(&counted.month.year) {
            add_to(totals, &counted);
        }
    }

    years
        .into_iter()
        .map(|(year, totals)| YearSummary { year, totals })
        .collect()
}

/// Folds January-June into H1 and July-December into H2.
pub fn semester_totals(months: &[MonthSummary; 12]) -> [SemesterSummary; 2] {
    let year = months[0].month.year;
    let fold = |range: std::ops::Range<usize>| {
        months[range]
            .iter()
            .fold(FlowTotals::default(), |mut totals, month| {
                totals += month.totals;
                totals
            })
    };

    [
        SemesterSummary {
            year,
            semester: Semester::H1,
            totals: fold(0..6),
        },
        SemesterSummary {
            year,
            semester: Semester::H2,
            totals: fold(6..12),
        },
    ]
}

/// Expense totals per selected category for the trailing months ending with `anchor`.
///
/// Each entry is tested against the policy for its own month, so a window that
/// straddles "now" mixes realized history with future projections.
#[instrument(skip(entries, selection, policy), fields(entries = entries.len(), anchor = %anchor))]
pub fn comparison_window(
    entries: &[LedgerEntry],
    anchor: MonthKey,
    window: usize,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> Result<ComparisonWindow> {
    let size = WindowSize::new(window)?;
    let mut months: Vec<WindowMonth> = size
        .months_ending(anchor)
        .into_iter()
        .map(|month| WindowMonth {
            month,
            by_category: BTreeMap::new(),
        })
        .collect();
    let first = months[0].month;

    for counted in entries
        .iter()
        .filter(|entry| entry.category_type == CategoryType::Expense)
        .filter_map(|entry| count_entry(entry, selection, policy))
        .filter(|counted| counted.month >= first && counted.month <= anchor)
    {
        let slot = &mut months[month_distance(first, counted.month)];
        *slot
            .by_category
            .entry(counted.entry.category_name.clone())
            .or_insert(Decimal::ZERO) += counted.entry.magnitude();
    }

    debug!(months = size.months(), "Built comparison window");
    Ok(ComparisonWindow { anchor, months })
}

fn month_distance(from: MonthKey, to: MonthKey) -> usize {
    ((to.year - from.year) * 12 + to.month as i32 - from.month as i32) as usize
}

/// Category by month breakdown of `year`, split into income and expense rows.
#[instrument(skip(entries, selection, policy), fields(entries = entries.len()))]
pub fn category_matrix(
    entries: &[LedgerEntry],
    year: i32,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> CategoryMatrix {
    let mut income: BTreeMap<String, MatrixRow> = BTreeMap::new();
    let mut expenses: BTreeMap<String, MatrixRow> = BTreeMap::new();

    for counted in entries
        .iter()
        .filter_map(|entry| count_entry(entry, selection, policy))
        .filter(|counted| counted.month.year == year)
    {
        let rows = match counted.entry.category_type {
            CategoryType::Income => &mut income,
            _ => &mut expenses,
        };
        let name = &counted.entry.category_name;
        let row = rows
            .entry(name.clone())
            .or_insert_with(|| MatrixRow::new(name));
        row.months[counted.month.index()] += counted.entry.magnitude();
    }

    let income_rows: Vec<MatrixRow> = income.into_values().collect();
    let expense_rows: Vec<MatrixRow> = expenses.into_values().collect();
    let income_subtotal = subtotal("Total income", &income_rows);
    let expense_subtotal = subtotal("Total expenses", &expense_rows);

    let mut net_total = MatrixRow::new("Net");
    for index in 0..12 {
        net_total.months[index] = income_subtotal.months[index] - expense_subtotal.months[index];
    }

    CategoryMatrix {
        year,
        income_rows,
        income_subtotal,
        expense_rows,
        expense_subtotal,
        net_total,
    }
}

fn subtotal(label: &str, rows: &[MatrixRow]) -> MatrixRow {
    let mut total = MatrixRow::new(label);
    for row in rows {
        for (slot, value) in total.months.iter_mut().zip(row.months.iter()) {
            *slot += *value;
        }
    }
    total
}

/// Renders the requested metrics over the trailing window ending with `anchor`.
///
/// Investment figures are read from `growth`, one series per year; months of a
/// year without a series read as zero.
#[instrument(skip(entries, selection, policy, growth), fields(entries = entries.len(), anchor = %anchor))]
pub fn custom_metrics(
    entries: &[LedgerEntry],
    anchor: MonthKey,
    window: usize,
    metrics: &[MetricKind],
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
    growth: &[GrowthSeries],
) -> Result<MetricSeries> {
    let months = WindowSize::new(window)?.months_ending(anchor);
    let mut flows = vec![FlowTotals::default(); months.len()];
    let first = months[0];

    for counted in entries
        .iter()
        .filter_map(|entry| count_entry(entry, selection, policy))
        .filter(|counted| counted.month >= first && counted.month <= anchor)
    {
        add_to(&mut flows[month_distance(first, counted.month)], &counted);
    }

    let investment = |month: &MonthKey, pick: fn(&GrowthSeries) -> &[Decimal; 12]| {
        growth
            .iter()
            .find(|series| series.year == month.year)
            .map(|series| pick(series)[month.index()])
            .unwrap_or(Decimal::ZERO)
    };

    let lines = metrics
        .iter()
        .map(|metric| {
            let values = match metric {
                MetricKind::Income => flows.iter().map(FlowTotals::total_income).collect(),
                MetricKind::Expenses => flows.iter().map(FlowTotals::total_expenses).collect(),
                MetricKind::Net => flows.iter().map(FlowTotals::net).collect(),
                MetricKind::InvestmentBalance => months
                    .iter()
                    .map(|month| investment(month, |series| &series.total_balance))
                    .collect(),
                MetricKind::InvestmentNetFlow => months
                    .iter()
                    .map(|month| investment(month, |series| &series.net_flow))
                    .collect(),
            };
            MetricLine {
                metric: *metric,
                values,
            }
        })
        .collect();

    Ok(MetricSeries { months, lines })
}
