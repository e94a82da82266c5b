use serde::{Deserialize, Serialize};

/// Data-quality counters collected while normalizing a snapshot.
///
/// Degradations are tolerated, never raised; these counters make them observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizationDiagnostics {
    /// Entries whose amount was missing or non-numeric and became zero.
    pub coerced_amounts: usize,
    /// Entries without a usable date, excluded from date-keyed grouping.
    pub undated_entries: usize,
    /// Recurring payments that contributed no entries because no occurrences were fetched.
    pub recurring_without_occurrences: usize,
}

impl NormalizationDiagnostics {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}
