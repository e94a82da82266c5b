use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use common::{
    BreakdownBy, Granularity, MetricKind, MonthKey, MutationIntent, MutationScope, OccurrenceEdit,
    SortOrder,
};
use compute::ProjectionPolicy;
use model::{AccountKind, PaymentStatus, Selection};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::report;
use crate::snapshot::Snapshot;

#[derive(Parser)]
#[command(name = "ledgerscope")]
#[command(about = "Dashboard aggregations, credit card statements and series planning over ledger snapshots")]
#[command(version)]
pub struct Cli {
    /// Snapshot of payments, occurrences, categories and accounts (JSON or YAML)
    #[arg(short, long, global = true, env = "LEDGERSCOPE_SNAPSHOT_PATH")]
    pub snapshot: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    /// Settings file, defaults to ./ledgerscope.toml when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the normalized ledger and its data-quality counters
    Normalize,
    /// Monthly, semester and category totals for one year
    Summary {
        /// Defaults to the current year
        #[arg(short, long)]
        year: Option<i32>,

        /// Only count expenses in these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Totals per year over an inclusive range
    Years {
        #[arg(long)]
        from: i32,

        #[arg(long)]
        to: i32,

        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Expenses per category over the trailing months ending at an anchor month
    Compare {
        #[arg(short, long)]
        year: Option<i32>,

        /// Anchor month, 1-12
        #[arg(short, long)]
        month: Option<u32>,

        /// Window length: 3, 6, 9 or 12 months
        #[arg(short, long, default_value_t = 6)]
        window: usize,

        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Selected metrics over the trailing months ending at an anchor month
    Metrics {
        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        month: Option<u32>,

        #[arg(short, long, default_value_t = 12)]
        window: usize,

        /// Metrics to plot (repeatable), defaults to income, expenses and net
        #[arg(long = "metric", value_enum)]
        metrics: Vec<Metric>,

        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Expense totals over a date range, by category or by month
    Breakdown {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        #[arg(long, value_enum, default_value_t = GroupBy::Category)]
        by: GroupBy,
    },
    /// Income versus expenses over a date range
    Flow {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        #[arg(long, value_enum, default_value_t = Period::Month)]
        granularity: Period,
    },
    /// Balances recalculated from realized entries
    Balances {
        #[arg(long, value_enum, default_value_t = Kind::BankAccount)]
        kind: Kind,
    },
    /// The billing cycle of a credit card that closes in the given month
    Statement {
        #[arg(long)]
        card: i32,

        #[arg(short, long)]
        year: i32,

        /// Closing month, 1-12
        #[arg(short, long)]
        month: u32,

        /// Display order, defaults to the configured one
        #[arg(long, value_enum)]
        order: Option<Order>,
    },
    /// Month-end balances of investment accounts for one year
    Growth {
        #[arg(short, long)]
        year: Option<i32>,

        /// Only these investment accounts (repeatable)
        #[arg(long = "account")]
        accounts: Vec<i32>,

        /// Derive opening balances from the accounts' current values
        #[arg(long)]
        anchor: bool,
    },
    /// Drafts for the missing occurrences of a recurring payment
    Expand {
        #[arg(short, long)]
        payment: i32,

        /// Last date to expand to, defaults to the configured horizon
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Plan an edit or delete on one occurrence of a payment
    Plan {
        #[arg(short, long)]
        payment: i32,

        /// Target occurrence; omitted targets the payment itself
        #[arg(short, long)]
        occurrence: Option<i32>,

        #[arg(long, value_enum, default_value_t = Scope::OnlyEvent)]
        scope: Scope,

        /// Delete instead of edit
        #[arg(long, conflicts_with_all = ["date", "amount", "status", "notes", "description", "category"])]
        delete: bool,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        amount: Option<Decimal>,

        #[arg(long, value_enum)]
        status: Option<Status>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Order {
    Older,
    Newer,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Older => SortOrder::Older,
            Order::Newer => SortOrder::Newer,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Metric {
    Income,
    Expenses,
    Net,
    InvestmentBalance,
    InvestmentNetFlow,
}

impl From<Metric> for MetricKind {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Income => MetricKind::Income,
            Metric::Expenses => MetricKind::Expenses,
            Metric::Net => MetricKind::Net,
            Metric::InvestmentBalance => MetricKind::InvestmentBalance,
            Metric::InvestmentNetFlow => MetricKind::InvestmentNetFlow,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupBy {
    Category,
    Month,
}

impl From<GroupBy> for BreakdownBy {
    fn from(by: GroupBy) -> Self {
        match by {
            GroupBy::Category => BreakdownBy::Category,
            GroupBy::Month => BreakdownBy::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Period {
    Day,
    Month,
}

impl From<Period> for Granularity {
    fn from(period: Period) -> Self {
        match period {
            Period::Day => Granularity::Day,
            Period::Month => Granularity::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Kind {
    BankAccount,
    CreditCard,
    InvestmentAccount,
}

impl From<Kind> for AccountKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::BankAccount => AccountKind::BankAccount,
            Kind::CreditCard => AccountKind::CreditCard,
            Kind::InvestmentAccount => AccountKind::InvestmentAccount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    OnlyEvent,
    FromEventForward,
    AllEvents,
}

impl From<Scope> for MutationScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::OnlyEvent => MutationScope::OnlyEvent,
            Scope::FromEventForward => MutationScope::FromEventForward,
            Scope::AllEvents => MutationScope::AllEvents,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Status {
    Pending,
    Scheduled,
    Processed,
    Failed,
    Cancelled,
    Reconciled,
}

impl From<Status> for PaymentStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => PaymentStatus::Pending,
            Status::Scheduled => PaymentStatus::Scheduled,
            Status::Processed => PaymentStatus::Processed,
            Status::Failed => PaymentStatus::Failed,
            Status::Cancelled => PaymentStatus::Cancelled,
            Status::Reconciled => PaymentStatus::Reconciled,
        }
    }
}

fn category_selection(categories: &[String]) -> Selection<String> {
    if categories.is_empty() {
        Selection::All
    } else {
        Selection::categories(categories)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

impl Cli {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let path = self
            .snapshot
            .or_else(|| settings.snapshot_path.clone())
            .ok_or_else(|| anyhow!("No snapshot given, pass --snapshot or set LEDGERSCOPE_SNAPSHOT_PATH"))?;
        let snapshot = Snapshot::load(&path)?;
        let policy = compute::default_policy(self.today);
        let now = policy.now();
        info!(%now, "Evaluating snapshot");

        match self.command {
            Commands::Normalize => print_json(&report::ledger(&snapshot))?,
            Commands::Summary { year, categories } => {
                let year = year.unwrap_or_else(|| report::current_year(now));
                let selection = category_selection(&categories);
                print_json(&report::year(&snapshot, year, &selection, &policy))?;
            }
            Commands::Years {
                from,
                to,
                categories,
            } => {
                let selection = category_selection(&categories);
                print_json(&report::years(&snapshot, from, to, &selection, &policy))?;
            }
            Commands::Compare {
                year,
                month,
                window,
                categories,
            } => {
                let anchor = anchor_month(&policy, year, month)?;
                let selection = category_selection(&categories);
                print_json(&report::compare(
                    &snapshot, anchor, window, &selection, &policy,
                )?)?;
            }
            Commands::Metrics {
                year,
                month,
                window,
                metrics,
                categories,
            } => {
                let anchor = anchor_month(&policy, year, month)?;
                let kinds: Vec<MetricKind> = if metrics.is_empty() {
                    vec![MetricKind::Income, MetricKind::Expenses, MetricKind::Net]
                } else {
                    metrics.into_iter().map(MetricKind::from).collect()
                };
                let selection = category_selection(&categories);
                print_json(&report::metrics(
                    &snapshot, anchor, window, &kinds, &selection, &policy,
                )?)?;
            }
            Commands::Breakdown { start, end, by } => {
                print_json(&report::breakdown(&snapshot, start, end, by.into())?)?;
            }
            Commands::Flow {
                start,
                end,
                granularity,
            } => {
                print_json(&report::flow(&snapshot, start, end, granularity.into())?)?;
            }
            Commands::Balances { kind } => {
                print_json(&report::account_balances(&snapshot, kind.into()))?;
            }
            Commands::Statement {
                card,
                year,
                month,
                order,
            } => {
                let order = order.map_or(settings.statement_sort_order, SortOrder::from);
                print_json(&report::card_statement(
                    &snapshot, card, year, month, order, now,
                )?)?;
            }
            Commands::Growth {
                year,
                accounts,
                anchor,
            } => {
                let year = year.unwrap_or_else(|| report::current_year(now));
                let selection = if accounts.is_empty() {
                    Selection::All
                } else {
                    Selection::only(accounts)
                };
                print_json(&report::investment_growth(
                    &snapshot, year, &selection, anchor, &policy,
                ))?;
            }
            Commands::Expand { payment, until } => {
                print_json(&report::expand(
                    &snapshot,
                    payment,
                    until,
                    settings.horizon_days,
                    now,
                )?)?;
            }
            Commands::Plan {
                payment,
                occurrence,
                scope,
                delete,
                date,
                amount,
                status,
                notes,
                description,
                category,
            } => {
                let intent = if delete {
                    MutationIntent::Delete
                } else {
                    MutationIntent::Edit(OccurrenceEdit {
                        date,
                        amount,
                        status: status.map(PaymentStatus::from),
                        notes,
                        description,
                        category,
                        ..OccurrenceEdit::default()
                    })
                };
                print_json(&report::plan(
                    &snapshot,
                    payment,
                    occurrence,
                    &intent,
                    scope.into(),
                )?)?;
            }
        }
        Ok(())
    }
}

fn anchor_month(policy: &ProjectionPolicy, year: Option<i32>, month: Option<u32>) -> Result<MonthKey> {
    let current = report::current_month(policy.now());
    let month = month.unwrap_or(current.month);
    MonthKey::new(year.unwrap_or(current.year), month)
        .ok_or_else(|| anyhow!("Month must be between 1 and 12, got {month}"))
}
