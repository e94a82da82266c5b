//! Assembles engine results into the documents the CLI prints.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use common::{
    BreakdownBy, CategoryMatrix, ComparisonWindow, ExpenseBreakdown, Granularity, GrowthSeries,
    IncomeVsExpenses, MetricKind, MetricSeries, MonthKey, MonthSummary, MutationIntent,
    MutationPlan, MutationScope, NormalizationDiagnostics, OccurrenceDraft, SemesterSummary,
    SortOrder, StatementCycle, YearSummary,
};
use compute::aggregator::{self, WindowSize};
use compute::growth;
use compute::recurrence;
use compute::{balances, reports, statement};
use compute::{ProjectionPolicy, StatementSchedule};
use model::{AccountKind, LedgerEntry, Selection};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::snapshot::Snapshot;

#[derive(Debug, Serialize)]
pub struct LedgerReport {
    pub entries: Vec<LedgerEntry>,
    pub diagnostics: NormalizationDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub months: Vec<MonthSummary>,
    pub semesters: Vec<SemesterSummary>,
    pub matrix: CategoryMatrix,
}

#[derive(Debug, Serialize)]
pub struct StatementReport {
    pub card_id: i32,
    pub card_name: String,
    pub available_credit: Decimal,
    pub utilization_percentage: Decimal,
    pub cycle: StatementCycle,
}

#[derive(Debug, Serialize)]
pub struct ExpansionReport {
    pub payment_id: i32,
    pub up_to: NaiveDate,
    pub drafts: Vec<OccurrenceDraft>,
}

pub fn ledger(snapshot: &Snapshot) -> LedgerReport {
    let ledger = snapshot.ledger();
    LedgerReport {
        entries: ledger.entries,
        diagnostics: ledger.diagnostics,
    }
}

#[instrument(skip(snapshot, selection, policy))]
pub fn year(
    snapshot: &Snapshot,
    year: i32,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> YearReport {
    let entries = snapshot.ledger().entries;
    let months = aggregator::build_month_summary(&entries, year, selection, policy);
    let semesters = aggregator::semester_totals(&months);
    let matrix = aggregator::category_matrix(&entries, year, selection, policy);
    YearReport {
        year,
        months: months.to_vec(),
        semesters: semesters.to_vec(),
        matrix,
    }
}

pub fn years(
    snapshot: &Snapshot,
    from_year: i32,
    to_year: i32,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> Vec<YearSummary> {
    let entries = snapshot.ledger().entries;
    aggregator::yearly_totals(&entries, from_year, to_year, selection, policy)
}

pub fn compare(
    snapshot: &Snapshot,
    anchor: MonthKey,
    window: usize,
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> Result<ComparisonWindow> {
    let entries = snapshot.ledger().entries;
    let window = aggregator::comparison_window(&entries, anchor, window, selection, policy)?;
    Ok(window)
}

/// Custom metrics over the window ending at `anchor`.
///
/// Investment lines read unanchored growth series for every year the window touches.
pub fn metrics(
    snapshot: &Snapshot,
    anchor: MonthKey,
    window: usize,
    kinds: &[MetricKind],
    selection: &Selection<String>,
    policy: &ProjectionPolicy,
) -> Result<MetricSeries> {
    let entries = snapshot.ledger().entries;
    let years: BTreeSet<i32> = WindowSize::new(window)?
        .months_ending(anchor)
        .iter()
        .map(|month| month.year)
        .collect();
    let growth: Vec<GrowthSeries> = years
        .into_iter()
        .map(|year| {
            growth::accumulate(
                &entries,
                &snapshot.investment_accounts,
                &Selection::All,
                year,
                policy,
                &HashMap::new(),
            )
        })
        .collect();
    let series =
        aggregator::custom_metrics(&entries, anchor, window, kinds, selection, policy, &growth)?;
    Ok(series)
}

pub fn breakdown(
    snapshot: &Snapshot,
    start: NaiveDate,
    end: NaiveDate,
    by: BreakdownBy,
) -> Result<ExpenseBreakdown> {
    let report = reports::expense_breakdown(&snapshot.ledger().entries, start, end, by)?;
    Ok(report)
}

pub fn flow(
    snapshot: &Snapshot,
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
) -> Result<IncomeVsExpenses> {
    let report = reports::income_vs_expenses(&snapshot.ledger().entries, start, end, granularity)?;
    Ok(report)
}

pub fn account_balances(snapshot: &Snapshot, kind: AccountKind) -> BTreeMap<i32, Decimal> {
    balances::recalculate_balances(&snapshot.ledger().entries, kind)
}

#[instrument(skip(snapshot))]
pub fn card_statement(
    snapshot: &Snapshot,
    card_id: i32,
    year: i32,
    month: u32,
    order: SortOrder,
    now: NaiveDate,
) -> Result<StatementReport> {
    let card = snapshot
        .credit_card(card_id)
        .ok_or_else(|| anyhow!("Credit card {card_id} is not in the snapshot"))?;
    let schedule = StatementSchedule::for_card(card)
        .with_context(|| format!("Credit card {card_id} has an invalid billing schedule"))?;
    let entries = statement::card_entries(&snapshot.ledger().entries, card_id);
    let cycle = schedule.statement_for(&entries, year, month, order, now)?;
    info!(
        entries = cycle.entry_count(),
        status = ?cycle.status,
        "Built statement"
    );

    Ok(StatementReport {
        card_id,
        card_name: card.name.clone(),
        available_credit: card.available_credit(),
        utilization_percentage: card.utilization_percentage(),
        cycle,
    })
}

/// Investment growth for `year`.
///
/// With `anchored`, opening balances are derived from the accounts' current
/// values as of `policy.now()`; otherwise every account opens at zero.
pub fn investment_growth(
    snapshot: &Snapshot,
    year: i32,
    selection: &Selection<i32>,
    anchored: bool,
    policy: &ProjectionPolicy,
) -> GrowthSeries {
    let entries = snapshot.ledger().entries;
    let opening = if anchored {
        growth::opening_balances_from_current(&snapshot.investment_accounts, &entries, policy.now())
    } else {
        HashMap::new()
    };
    growth::accumulate(
        &entries,
        &snapshot.investment_accounts,
        selection,
        year,
        policy,
        &opening,
    )
}

/// Drafts for the dates of a recurring payment that have no occurrence yet.
#[instrument(skip(snapshot))]
pub fn expand(
    snapshot: &Snapshot,
    payment_id: i32,
    up_to: Option<NaiveDate>,
    horizon_days: u64,
    now: NaiveDate,
) -> Result<ExpansionReport> {
    let payment = snapshot
        .payment(payment_id)
        .ok_or_else(|| anyhow!("Payment {payment_id} is not in the snapshot"))?;
    let up_to = up_to.unwrap_or_else(|| recurrence::horizon(now, horizon_days));
    let existing: HashSet<NaiveDate> = snapshot
        .series(payment_id)
        .iter()
        .filter_map(|occurrence| occurrence.scheduled_date)
        .collect();
    let drafts = recurrence::generate_occurrences(payment, up_to, &existing, &snapshot.overrides);
    debug!(drafts = drafts.len(), existing = existing.len(), "Expanded payment");

    Ok(ExpansionReport {
        payment_id,
        up_to,
        drafts,
    })
}

/// Plans a scoped mutation on occurrence `occurrence_id` of a payment.
///
/// Without an occurrence id the mutation targets the payment itself.
pub fn plan(
    snapshot: &Snapshot,
    payment_id: i32,
    occurrence_id: Option<i32>,
    intent: &MutationIntent,
    scope: MutationScope,
) -> Result<MutationPlan> {
    let payment = snapshot
        .payment(payment_id)
        .ok_or_else(|| anyhow!("Payment {payment_id} is not in the snapshot"))?;
    let series = snapshot.series(payment_id);
    let target = match occurrence_id {
        Some(id) => Some(
            series
                .iter()
                .find(|occurrence| occurrence.id == id)
                .ok_or_else(|| anyhow!("Occurrence {id} does not belong to payment {payment_id}"))?,
        ),
        None => None,
    };
    Ok(compute::plan_mutation(payment, series, target, intent, scope))
}

/// The month of `now`, used as the comparison anchor when none is given.
pub fn current_month(now: NaiveDate) -> MonthKey {
    MonthKey::from_date(now)
}

/// `now`'s year, used when a year argument is omitted.
pub fn current_year(now: NaiveDate) -> i32 {
    now.year()
}
