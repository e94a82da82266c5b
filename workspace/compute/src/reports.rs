//! Range reports: expense breakdowns and income versus expenses series.
//!
//! Unlike the dashboard views these do not apply the projection policy. They
//! report everything dated in the range except cancelled, failed and unknown
//! entries. Transfers fall in neither column.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use common::{
    BreakdownBy, BreakdownItem, ExpenseBreakdown, Granularity, IncomeVsExpenses, MonthKey,
    PeriodFlow,
};
use model::{CategoryType, LedgerEntry};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::error::{ComputeError, Result};

fn in_range(
    entries: &[LedgerEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<impl Iterator<Item = (NaiveDate, &LedgerEntry)>> {
    if start > end {
        return Err(ComputeError::InvalidDateRange { start, end });
    }
    Ok(entries
        .iter()
        .filter(|entry| !entry.status.is_ignored_in_reports())
        .filter_map(move |entry| {
            entry
                .due_date
                .filter(|date| *date >= start && *date <= end)
                .map(|date| (date, entry))
        }))
}

#[instrument(skip(entries), fields(entries = entries.len()))]
pub fn expense_breakdown(
    entries: &[LedgerEntry],
    start: NaiveDate,
    end: NaiveDate,
    breakdown_by: BreakdownBy,
) -> Result<ExpenseBreakdown> {
    let mut grouped: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut total_expenses = Decimal::ZERO;

    for (date, entry) in in_range(entries, start, end)?
        .filter(|(_, entry)| entry.category_type == CategoryType::Expense)
    {
        let label = match breakdown_by {
            BreakdownBy::Category => entry.category_name.clone(),
            BreakdownBy::Month => MonthKey::from_date(date).to_string(),
        };
        *grouped.entry(label).or_insert(Decimal::ZERO) += entry.magnitude();
        total_expenses += entry.magnitude();
    }

    Ok(ExpenseBreakdown {
        start_date: start,
        end_date: end,
        breakdown_by,
        items: grouped
            .into_iter()
            .map(|(label, total)| BreakdownItem { label, total })
            .collect(),
        total_expenses,
    })
}

#[instrument(skip(entries), fields(entries = entries.len()))]
pub fn income_vs_expenses(
    entries: &[LedgerEntry],
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
) -> Result<IncomeVsExpenses> {
    let mut periods: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    for (date, entry) in in_range(entries, start, end)? {
        let period = match granularity {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Month => MonthKey::from_date(date).to_string(),
        };
        match entry.category_type {
            CategoryType::Income => {
                periods.entry(period).or_default().0 += entry.magnitude();
                total_income += entry.magnitude();
            }
            CategoryType::Expense => {
                periods.entry(period).or_default().1 += entry.magnitude();
                total_expenses += entry.magnitude();
            }
            CategoryType::Transfer => {}
        }
    }

    Ok(IncomeVsExpenses {
        start_date: start,
        end_date: end,
        granularity,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        series: periods
            .into_iter()
            .map(|(period, (income, expenses))| PeriodFlow {
                period,
                income,
                expenses,
                net: income - expenses,
            })
            .collect(),
    })
}
