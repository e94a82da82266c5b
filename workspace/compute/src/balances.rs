use std::collections::BTreeMap;

use model::{AccountKind, LedgerEntry};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

/// Balances of every account of `kind` touched by a realized entry.
///
/// An account's balance is what entered it minus what left it, counting only
/// processed and reconciled entries.
#[instrument(skip(entries), fields(entries = entries.len()))]
pub fn recalculate_balances(entries: &[LedgerEntry], kind: AccountKind) -> BTreeMap<i32, Decimal> {
    let mut balances: BTreeMap<i32, Decimal> = BTreeMap::new();

    for entry in entries.iter().filter(|entry| entry.status.is_realized()) {
        let incoming = entry.to_account.filter(|account| account.kind == kind);
        if let Some(id) = incoming.and_then(|account| account.id) {
            *balances.entry(id).or_insert(Decimal::ZERO) += entry.magnitude();
        }
        let outgoing = entry.from_account.filter(|account| account.kind == kind);
        if let Some(id) = outgoing.and_then(|account| account.id) {
            *balances.entry(id).or_insert(Decimal::ZERO) -= entry.magnitude();
        }
    }

    debug!(accounts = balances.len(), ?kind, "Recalculated balances");
    balances
}
