//! Credit card billing cycles.

use chrono::{Days, NaiveDate};
use common::{CycleEntry, CycleStatus, DateGroup, MonthKey, SortOrder, StatementCycle};
use model::{AccountKind, CreditCard, LedgerEntry};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};

/// Signs the ledger entries that touch one credit card.
///
/// Money leaving through the card is a charge (`+|amount|`), money paid into
/// the card is a payment (`-|amount|`). Entries that do not touch the card,
/// and entries with a cancelled, failed or unknown status, are skipped.
pub fn card_entries(entries: &[LedgerEntry], card_id: i32) -> Vec<CycleEntry> {
    entries
        .iter()
        .filter(|entry| !entry.status.is_ignored_in_reports())
        .filter_map(|entry| {
            let signed_amount = if entry.is_from(AccountKind::CreditCard, card_id) {
                entry.magnitude()
            } else if entry.is_to(AccountKind::CreditCard, card_id) {
                -entry.magnitude()
            } else {
                return None;
            };
            Some(CycleEntry {
                entry: entry.clone(),
                signed_amount,
            })
        })
        .collect()
}

/// Builds the cycle covering `[start, end]`.
///
/// Running balances are always folded oldest first; `order` only changes the
/// display order of groups and of entries within a group.
#[instrument(skip(entries), fields(entries = entries.len(), start = %start, end = %end))]
pub fn build_cycle(
    entries: &[CycleEntry],
    start: NaiveDate,
    end: NaiveDate,
    close: NaiveDate,
    due: NaiveDate,
    order: SortOrder,
    now: NaiveDate,
) -> Result<StatementCycle> {
    if start > end {
        return Err(ComputeError::InvalidDateRange { start, end });
    }

    let mut within: Vec<&CycleEntry> = entries
        .iter()
        .filter(|cycle_entry| cycle_entry.entry.is_between(start, end))
        .collect();
    within.sort_by_key(|cycle_entry| (cycle_entry.entry.due_date, cycle_entry.entry.id));

    let mut groups: Vec<DateGroup> = Vec::new();
    let mut running = Decimal::ZERO;
    let mut charges_total = Decimal::ZERO;
    let mut payments_total = Decimal::ZERO;

    for cycle_entry in within {
        let Some(date) = cycle_entry.entry.due_date else {
            continue;
        };
        running += cycle_entry.signed_amount;
        if cycle_entry.is_charge() {
            charges_total += cycle_entry.signed_amount;
        } else {
            payments_total += cycle_entry.signed_amount.abs();
        }

        match groups.last_mut() {
            Some(group) if group.date == date => {
                group.entries.push(cycle_entry.clone());
                group.closing_balance = running;
            }
            _ => groups.push(DateGroup {
                date,
                entries: vec![cycle_entry.clone()],
                closing_balance: running,
            }),
        }
    }

    if order == SortOrder::Newer {
        groups.reverse();
        for group in &mut groups {
            group.entries.reverse();
        }
    }

    let statement_balance = charges_total - payments_total;
    let status = cycle_status(statement_balance, &groups, due, now);
    debug!(
        groups = groups.len(),
        %charges_total,
        %payments_total,
        ?status,
        "Built statement cycle"
    );

    Ok(StatementCycle {
        start_date: start,
        end_date: end,
        close_date: close,
        due_date: due,
        sort_order: order,
        groups,
        charges_total,
        payments_total,
        statement_balance,
        status,
    })
}

// A settled balance wins even past the due date.
fn cycle_status(balance: Decimal, groups: &[DateGroup], due: NaiveDate, now: NaiveDate) -> CycleStatus {
    if balance <= Decimal::ZERO {
        CycleStatus::Paid
    } else if now > due {
        CycleStatus::Overdue
    } else if groups
        .iter()
        .flat_map(|group| group.entries.iter())
        .any(|cycle_entry| cycle_entry.is_payment() && cycle_entry.entry.status.is_planned())
    {
        CycleStatus::PaymentPendingConfirmation
    } else {
        CycleStatus::Open
    }
}

/// Start, end, close and due dates of one billing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub close: NaiveDate,
    pub due: NaiveDate,
}

/// When a card's cycles close and fall due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSchedule {
    close_day: u32,
    due_days: u32,
}

impl StatementSchedule {
    pub fn new(close_day: u32, due_days: u32) -> Result<Self> {
        if !(1..=31).contains(&close_day) {
            return Err(ComputeError::InvalidCloseDay(close_day));
        }
        Ok(Self { close_day, due_days })
    }

    pub fn for_card(card: &CreditCard) -> Result<Self> {
        Self::new(card.invoice_close_day, card.payment_due_day)
    }

    /// The cycle that closes in `month` (1-based) of `year`.
    pub fn cycle_for(&self, year: i32, month: u32) -> Result<CycleBounds> {
        let month = MonthKey::new(year, month).ok_or(ComputeError::InvalidMonth(month))?;
        Ok(self.bounds(month))
    }

    /// The cycle whose `[start, end]` covers `date`.
    pub fn cycle_containing(&self, date: NaiveDate) -> CycleBounds {
        let month = MonthKey::from_date(date);
        if date <= month.clamped_day(self.close_day) {
            self.bounds(month)
        } else {
            self.bounds(month.next())
        }
    }

    /// Builds the statement that closes in `month` of `year`.
    pub fn statement_for(
        &self,
        entries: &[CycleEntry],
        year: i32,
        month: u32,
        order: SortOrder,
        now: NaiveDate,
    ) -> Result<StatementCycle> {
        let bounds = self.cycle_for(year, month)?;
        build_cycle(
            entries,
            bounds.start,
            bounds.end,
            bounds.close,
            bounds.due,
            order,
            now,
        )
    }

    fn bounds(&self, month: MonthKey) -> CycleBounds {
        let close = month.clamped_day(self.close_day);
        let previous_close = month.previous().clamped_day(self.close_day);
        let start = previous_close.succ_opt().unwrap_or(previous_close);
        let due = close
            .checked_add_days(Days::new(u64::from(self.due_days)))
            .unwrap_or(close);
        CycleBounds {
            start,
            end: close,
            close,
            due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{card_charge, card_payment, date, dec, expense};
    use model::PaymentStatus;

    fn march_entries() -> Vec<CycleEntry> {
        card_entries(
            &[
                card_charge(1, "2026-03-02", 120, 9),
                card_charge(2, "2026-03-02", 30, 9),
                card_payment(3, "2026-03-10", 100, 9, PaymentStatus::Processed),
                card_charge(4, "2026-03-15", 45, 9),
                card_charge(5, "2026-02-27", 500, 9),
                card_charge(6, "2026-03-05", 80, 4),
                expense(7, "2026-03-06", 15, PaymentStatus::Processed),
            ],
            9,
        )
    }

    fn build(entries: &[CycleEntry], order: SortOrder, now: &str) -> StatementCycle {
        build_cycle(
            entries,
            date("2026-03-01"),
            date("2026-03-31"),
            date("2026-03-31"),
            date("2026-04-10"),
            order,
            date(now),
        )
        .unwrap()
    }

    #[test]
    fn test_card_entries_are_signed_relative_to_the_card() {
        let entries = march_entries();

        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].signed_amount, dec(120));
        assert_eq!(entries[2].signed_amount, dec(-100));
        assert!(entries[2].is_payment());
    }

    #[test]
    fn test_running_balance_and_totals() {
        let cycle = build(&march_entries(), SortOrder::Older, "2026-03-20");

        let balances: Vec<Decimal> = cycle.groups.iter().map(|g| g.closing_balance).collect();
        assert_eq!(balances, vec![dec(150), dec(50), dec(95)]);
        assert_eq!(cycle.groups[0].entries.len(), 2);
        assert_eq!(cycle.entry_count(), 4);
        assert_eq!(cycle.charges_total, dec(195));
        assert_eq!(cycle.payments_total, dec(100));
        assert_eq!(cycle.statement_balance, cycle.charges_total - cycle.payments_total);
        assert_eq!(cycle.status, CycleStatus::Open);
    }

    #[test]
    fn test_display_order_does_not_change_balances() {
        let mut shuffled = march_entries();
        shuffled.reverse();

        let older = build(&march_entries(), SortOrder::Older, "2026-03-20");
        let mut newer = build(&shuffled, SortOrder::Newer, "2026-03-20");

        assert_eq!(newer.groups[0].date, date("2026-03-15"));
        newer.groups.reverse();
        for group in &mut newer.groups {
            group.entries.reverse();
        }
        assert_eq!(newer.groups, older.groups);
        assert_eq!(newer.statement_balance, older.statement_balance);
    }

    #[test]
    fn test_status_precedence() {
        let settled = card_entries(
            &[
                card_charge(1, "2026-03-02", 100, 9),
                card_payment(2, "2026-03-20", 100, 9, PaymentStatus::Processed),
            ],
            9,
        );
        let pending = card_entries(
            &[
                card_charge(1, "2026-03-02", 100, 9),
                card_payment(2, "2026-03-20", 40, 9, PaymentStatus::Pending),
            ],
            9,
        );

        // Paid wins even after the due date.
        assert_eq!(build(&settled, SortOrder::Older, "2026-05-01").status, CycleStatus::Paid);
        assert_eq!(build(&pending, SortOrder::Older, "2026-04-11").status, CycleStatus::Overdue);
        assert_eq!(
            build(&pending, SortOrder::Older, "2026-04-10").status,
            CycleStatus::PaymentPendingConfirmation
        );
        assert_eq!(build(&[], SortOrder::Older, "2026-04-11").status, CycleStatus::Paid);
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let result = build_cycle(
            &[],
            date("2026-03-31"),
            date("2026-03-01"),
            date("2026-03-31"),
            date("2026-04-10"),
            SortOrder::Older,
            date("2026-03-20"),
        );

        assert!(matches!(result, Err(ComputeError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_schedule_clamps_close_day() {
        let schedule = StatementSchedule::new(31, 10).unwrap();

        let february = schedule.cycle_for(2026, 2).unwrap();
        assert_eq!(february.start, date("2026-02-01"));
        assert_eq!(february.close, date("2026-02-28"));
        assert_eq!(february.due, date("2026-03-10"));

        let march = schedule.cycle_for(2026, 3).unwrap();
        assert_eq!(march.start, date("2026-03-01"));
        assert_eq!(march.end, date("2026-03-31"));
    }

    #[test]
    fn test_schedule_cycle_containing() {
        let schedule = StatementSchedule::new(15, 7).unwrap();

        let on_close = schedule.cycle_containing(date("2026-03-15"));
        assert_eq!(on_close.start, date("2026-02-16"));
        assert_eq!(on_close.close, date("2026-03-15"));

        let after_close = schedule.cycle_containing(date("2026-12-20"));
        assert_eq!(after_close.start, date("2026-12-16"));
        assert_eq!(after_close.close, date("2027-01-15"));
        assert_eq!(after_close.due, date("2027-01-22"));
    }

    #[test]
    fn test_schedule_rejects_bad_parameters() {
        assert_eq!(StatementSchedule::new(0, 10), Err(ComputeError::InvalidCloseDay(0)));
        assert_eq!(StatementSchedule::new(32, 10), Err(ComputeError::InvalidCloseDay(32)));
        assert_eq!(
            StatementSchedule::new(10, 10).unwrap().cycle_for(2026, 13),
            Err(ComputeError::InvalidMonth(13))
        );
    }
}
