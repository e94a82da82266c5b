use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Month-end investment values for one year.
///
/// Each account's trajectory is a step function: the value at month `m` is
/// the cumulative balance after every counted entry dated on or before the
/// end of that month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthSeries {
    pub year: i32,
    /// Cumulative value per account id, January through December.
    pub accounts: BTreeMap<i32, [Decimal; 12]>,
    /// Sum of the selected accounts' cumulative values per month.
    pub total_balance: [Decimal; 12],
    /// Inflow minus outflow during each month alone.
    pub net_flow: [Decimal; 12],
}

impl GrowthSeries {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            accounts: BTreeMap::new(),
            total_balance: [Decimal::ZERO; 12],
            net_flow: [Decimal::ZERO; 12],
        }
    }

    /// The trajectory of one account, if it was selected.
    pub fn account(&self, id: i32) -> Option<&[Decimal; 12]> {
        self.accounts.get(&id)
    }
}
