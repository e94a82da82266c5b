use chrono::NaiveDate;
use model::PaymentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How far an edit or delete on one occurrence propagates through its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationScope {
    OnlyEvent,
    FromEventForward,
    AllEvents,
}

/// The fields a user can change from an occurrence editor.
///
/// Date, amount, status and notes live on the occurrence; description,
/// category and tags are shared metadata that only exist on the parent payment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccurrenceEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<i32>>,
}

impl OccurrenceEdit {
    /// Returns true if the edit touches metadata stored on the parent payment.
    pub fn has_shared_metadata(&self) -> bool {
        self.description.is_some()
            || self.category.is_some()
            || self.category_id.is_some()
            || self.tag_ids.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum MutationIntent {
    Edit(OccurrenceEdit),
    Delete,
}

/// Field updates for one occurrence. Unset fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccurrenceChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Field updates for a payment. Unset fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl PaymentChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One instruction for the caller to issue against storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    UpdatePayment { target: i32, changes: PaymentChanges },
    DeletePayment { target: i32 },
    UpdateOccurrence { target: i32, changes: OccurrenceChanges },
    DeleteOccurrence { target: i32 },
}

/// What happens to a series when occurrences are deleted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesDecision {
    /// The parent payment goes away, cascading to every occurrence.
    DeleteSeries,
    /// The listed occurrences go away and the series ends the day before `before`.
    TruncateSeries { before: NaiveDate, ids: Vec<i32> },
    /// The listed occurrences go away; the series itself is untouched.
    DeleteOccurrences { ids: Vec<i32> },
}

/// A forward shift that would move an occurrence onto or before an earlier,
/// unshifted sibling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAnomaly {
    pub occurrence_id: i32,
    pub original_date: NaiveDate,
    pub shifted_date: NaiveDate,
    /// The earlier occurrence that the shifted one no longer follows.
    pub overtaken_occurrence_id: i32,
    pub overtaken_date: NaiveDate,
}

/// The concrete operations that implement one scoped edit or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationPlan {
    pub payment_id: i32,
    /// The scope actually applied; non-recurring payments always report `only_event`.
    pub scope: MutationScope,
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<SeriesDecision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<ShiftAnomaly>,
}
