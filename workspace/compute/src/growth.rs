use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use common::{GrowthSeries, MonthKey};
use model::{InvestmentAccount, LedgerEntry, Selection};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::projection::ProjectionPolicy;

/// Signed flows of one entry against investment accounts: `+` into, `-` out of.
fn investment_flows<'a>(
    entry: &'a LedgerEntry,
    selection: &'a Selection<i32>,
) -> impl Iterator<Item = (i32, Decimal)> + 'a {
    let inflow = entry
        .to_account
        .filter(|account| account.is_investment())
        .and_then(|account| account.id)
        .map(|id| (id, entry.magnitude()));
    let outflow = entry
        .from_account
        .filter(|account| account.is_investment())
        .and_then(|account| account.id)
        .map(|id| (id, -entry.magnitude()));

    inflow
        .into_iter()
        .chain(outflow)
        .filter(move |(id, _)| selection.contains(id))
}

/// Cumulative month-end values of the selected investment accounts for `year`.
///
/// Each account starts the year at its opening balance (zero if none is
/// given) and carries its running total forward month by month. Only entries
/// the policy counts for their own month contribute, so projected future
/// contributions never reach past months.
///
/// Every selected account gets a trajectory, flat when it saw no flows:
/// the ids of an explicit selection, the known `accounts` that pass it, and
/// any account with an opening balance or a counted flow.
#[instrument(skip(entries, accounts, selection, policy, opening), fields(entries = entries.len()))]
pub fn accumulate(
    entries: &[LedgerEntry],
    accounts: &[InvestmentAccount],
    selection: &Selection<i32>,
    year: i32,
    policy: &ProjectionPolicy,
    opening: &HashMap<i32, Decimal>,
) -> GrowthSeries {
    let mut series = GrowthSeries::empty(year);
    let explicit: Vec<i32> = match selection {
        Selection::All => Vec::new(),
        Selection::Only(ids) => ids.iter().copied().collect(),
    };
    let mut monthly: BTreeMap<i32, [Decimal; 12]> = explicit
        .into_iter()
        .chain(accounts.iter().map(|account| account.id))
        .chain(opening.keys().copied())
        .filter(|id| selection.contains(id))
        .map(|id| (id, [Decimal::ZERO; 12]))
        .collect();

    let mut dated: Vec<(NaiveDate, &LedgerEntry)> = entries
        .iter()
        .filter_map(|entry| entry.due_date.map(|date| (date, entry)))
        .filter(|(date, _)| date.year() == year)
        .collect();
    dated.sort_by_key(|(date, entry)| (*date, entry.id));

    for (date, entry) in dated {
        let month = MonthKey::from_date(date);
        if policy.classify(entry.status, month).is_none() {
            continue;
        }
        for (id, flow) in investment_flows(entry, selection) {
            monthly.entry(id).or_insert([Decimal::ZERO; 12])[month.index()] += flow;
            series.net_flow[month.index()] += flow;
        }
    }

    for (id, flows) in monthly {
        let mut running = opening.get(&id).copied().unwrap_or(Decimal::ZERO);
        let mut trajectory = [Decimal::ZERO; 12];
        for (slot, flow) in trajectory.iter_mut().zip(flows) {
            running += flow;
            *slot = running;
        }
        for (total, value) in series.total_balance.iter_mut().zip(trajectory) {
            *total += value;
        }
        series.accounts.insert(id, trajectory);
    }

    debug!(accounts = series.accounts.len(), "Accumulated investment growth");
    series
}

/// Opening balances on January 1 of `now`'s year, anchored on known current values.
///
/// An account's opening balance is its current value minus the net flow of
/// realized entries dated from January 1 through `now`.
pub fn opening_balances_from_current(
    accounts: &[InvestmentAccount],
    entries: &[LedgerEntry],
    now: NaiveDate,
) -> HashMap<i32, Decimal> {
    let year_start = MonthKey::new(now.year(), 1)
        .map(|month| month.first_day())
        .unwrap_or(now);
    let mut realized: HashMap<i32, Decimal> = HashMap::new();

    for entry in entries
        .iter()
        .filter(|entry| entry.status.is_realized() && entry.is_between(year_start, now))
    {
        for (id, flow) in investment_flows(entry, &Selection::All) {
            *realized.entry(id).or_insert(Decimal::ZERO) += flow;
        }
    }

    accounts
        .iter()
        .map(|account| {
            let flow = realized.get(&account.id).copied().unwrap_or(Decimal::ZERO);
            (account.id, account.current_value - flow)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{contribution, date, dec, withdrawal};
    use model::PaymentStatus;

    fn policy() -> ProjectionPolicy {
        ProjectionPolicy::new(date("2026-04-15"))
    }

    #[test]
    fn test_step_function_carries_balance_forward() {
        let entries = vec![
            contribution(1, "2026-01-10", 100, 7),
            contribution(2, "2026-03-05", 50, 7),
            withdrawal(3, "2026-03-20", 30, 7),
        ];

        let series = accumulate(&entries, &[], &Selection::All, 2026, &policy(), &HashMap::new());

        let account = series.account(7).unwrap();
        assert_eq!(account[0], dec(100));
        assert_eq!(account[1], dec(100));
        assert_eq!(account[2], dec(120));
        assert_eq!(account[11], dec(120));
        assert_eq!(series.net_flow[1], Decimal::ZERO);
        assert_eq!(series.net_flow[2], dec(20));
    }

    #[test]
    fn test_projected_contributions_only_count_in_future_months() {
        let mut stale = contribution(1, "2026-02-01", 100, 7);
        stale.status = PaymentStatus::Scheduled;
        let mut planned = contribution(2, "2026-06-01", 200, 7);
        planned.status = PaymentStatus::Pending;

        let series = accumulate(&[stale, planned], &[], &Selection::All, 2026, &policy(), &HashMap::new());

        let account = series.account(7).unwrap();
        assert_eq!(account[1], Decimal::ZERO);
        assert_eq!(account[4], Decimal::ZERO);
        assert_eq!(account[5], dec(200));
    }

    #[test]
    fn test_selection_and_total_balance() {
        let entries = vec![
            contribution(1, "2026-01-10", 100, 7),
            contribution(2, "2026-02-10", 40, 8),
            contribution(3, "2026-02-11", 999, 9),
        ];
        let opening = HashMap::from([(7, dec(1000)), (9, dec(5))]);

        let series = accumulate(&entries, &[], &Selection::only([7, 8]), 2026, &policy(), &opening);

        assert!(series.account(9).is_none());
        assert_eq!(series.account(7).unwrap()[0], dec(1100));
        assert_eq!(series.total_balance[0], dec(1100));
        assert_eq!(series.total_balance[1], dec(1140));
        assert_eq!(series.net_flow[1], dec(40));
    }

    #[test]
    fn test_selected_accounts_without_flows_get_flat_trajectories() {
        let entries = vec![contribution(1, "2026-01-10", 100, 7)];
        let known = vec![InvestmentAccount {
            id: 5,
            name: "Pension".to_string(),
            current_value: dec(0),
        }];

        let chosen = accumulate(&entries, &known, &Selection::only([7, 8]), 2026, &policy(), &HashMap::new());
        assert_eq!(chosen.account(8), Some(&[Decimal::ZERO; 12]));
        assert!(chosen.account(5).is_none());

        let everything = accumulate(&entries, &known, &Selection::All, 2026, &policy(), &HashMap::new());
        assert_eq!(everything.account(5), Some(&[Decimal::ZERO; 12]));
        assert_eq!(everything.account(7).unwrap()[11], dec(100));
    }

    #[test]
    fn test_entries_outside_the_year_are_ignored() {
        let entries = vec![contribution(1, "2025-12-31", 100, 7)];

        let series = accumulate(&entries, &[], &Selection::All, 2026, &policy(), &HashMap::new());

        assert!(series.accounts.is_empty());
        assert_eq!(series.total_balance, [Decimal::ZERO; 12]);
    }

    #[test]
    fn test_opening_balances_from_current_value() {
        let accounts = vec![InvestmentAccount {
            id: 7,
            name: "Brokerage".to_string(),
            current_value: dec(1500),
        }];
        let mut planned = contribution(4, "2026-04-01", 75, 7);
        planned.status = PaymentStatus::Scheduled;
        let entries = vec![
            contribution(1, "2026-01-10", 300, 7),
            withdrawal(2, "2026-02-01", 100, 7),
            contribution(3, "2025-11-01", 999, 7),
            planned,
        ];

        let opening = opening_balances_from_current(&accounts, &entries, date("2026-04-15"));
        assert_eq!(opening.get(&7), Some(&dec(1300)));

        // Anchored trajectories land on the known value at "now".
        let series = accumulate(&entries, &[], &Selection::All, 2026, &policy(), &opening);
        assert_eq!(series.account(7).unwrap()[3], dec(1500));
    }
}
