//! Result types handed from the engine to presentation code.
//! These structs are what the dashboard renders: month and year summaries,
//! statement cycles, investment trajectories, reports and mutation plans.
//! They carry no behavior beyond small derived accessors.

mod diagnostics;
mod drafts;
mod growth;
mod month;
mod mutation;
mod reports;
mod statement;
mod summary;

pub use diagnostics::NormalizationDiagnostics;
pub use drafts::OccurrenceDraft;
pub use growth::GrowthSeries;
pub use month::MonthKey;
pub use mutation::{
    MutationIntent, MutationPlan, MutationScope, OccurrenceChanges, OccurrenceEdit, Operation,
    PaymentChanges, SeriesDecision, ShiftAnomaly,
};
pub use reports::{
    BreakdownBy, BreakdownItem, ExpenseBreakdown, Granularity, IncomeVsExpenses, PeriodFlow,
};
pub use statement::{CycleEntry, CycleStatus, DateGroup, SortOrder, StatementCycle};
pub use summary::{
    CategoryMatrix, ComparisonWindow, FlowTotals, MatrixRow, MetricKind, MetricLine,
    MetricSeries, MonthSummary, Semester, SemesterSummary, WindowMonth, YearSummary,
};
