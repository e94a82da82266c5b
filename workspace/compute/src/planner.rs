//! Turns a scoped edit or delete on one occurrence into storage operations.
//!
//! The planner never touches storage. It returns the operations the caller
//! must issue, plus the series-level decision behind a delete and any
//! anomalies a date shift would introduce.

use chrono::{Days, NaiveDate, TimeDelta};
use common::{
    MutationIntent, MutationPlan, MutationScope, OccurrenceChanges, OccurrenceEdit, Operation,
    PaymentChanges, SeriesDecision, ShiftAnomaly,
};
use model::{Occurrence, RawPayment};
use tracing::{debug, instrument, warn};

/// Plans `intent` on `target`, an occurrence of `payment`, under `scope`.
///
/// `series` is every fetched occurrence of the payment. Non-recurring
/// payments, and recurring ones without a target occurrence, get a single
/// direct operation on the payment whatever the scope.
#[instrument(
    skip(payment, series, target, intent),
    fields(payment_id = payment.id, target = ?target.map(|occurrence| occurrence.id))
)]
pub fn plan_mutation(
    payment: &RawPayment,
    series: &[Occurrence],
    target: Option<&Occurrence>,
    intent: &MutationIntent,
    scope: MutationScope,
) -> MutationPlan {
    let target = match target {
        Some(target) if payment.is_recurring() => target,
        _ => {
            debug!("Applying mutation directly to the payment");
            return direct_plan(payment, intent);
        }
    };

    let mut occurrences: Vec<&Occurrence> = series.iter().collect();
    if !occurrences.iter().any(|occurrence| occurrence.id == target.id) {
        warn!(occurrence_id = target.id, "Target occurrence missing from fetched series");
        occurrences.push(target);
    }
    occurrences.sort_by_key(|occurrence| (occurrence.date(), occurrence.id));

    let mut plan = MutationPlan {
        payment_id: payment.id,
        scope,
        operations: Vec::new(),
        decision: None,
        anomalies: Vec::new(),
    };

    match (intent, scope) {
        (MutationIntent::Edit(edit), MutationScope::OnlyEvent) => {
            push_occurrence_update(&mut plan, target.id, occurrence_changes(edit, edit.date));
            push_payment_update(&mut plan, payment.id, shared_metadata(edit));
        }
        (MutationIntent::Delete, MutationScope::OnlyEvent) => {
            let decision = SeriesDecision::DeleteOccurrences {
                ids: vec![target.id],
            };
            plan.operations = decision_operations(payment.id, &decision);
            plan.decision = Some(decision);
        }
        (MutationIntent::Edit(edit), MutationScope::FromEventForward) => {
            let selected = forward_selection(&occurrences, target);
            let delta = shift_delta(edit, target);
            plan.anomalies = shift_anomalies(&occurrences, &selected, delta);
            for anomaly in &plan.anomalies {
                warn!(
                    occurrence_id = anomaly.occurrence_id,
                    shifted_date = %anomaly.shifted_date,
                    overtaken = anomaly.overtaken_occurrence_id,
                    "Forward shift reorders the series"
                );
            }
            for occurrence in &selected {
                let date = shifted(occurrence.date(), delta);
                push_occurrence_update(&mut plan, occurrence.id, occurrence_changes(edit, date));
            }
            push_payment_update(&mut plan, payment.id, shared_metadata(edit));
        }
        (MutationIntent::Delete, MutationScope::FromEventForward) => {
            let selected = forward_selection(&occurrences, target);
            let decision = forward_delete_decision(&occurrences, &selected, target);
            plan.operations = decision_operations(payment.id, &decision);
            plan.decision = Some(decision);
        }
        (MutationIntent::Edit(edit), MutationScope::AllEvents) => {
            let delta = shift_delta(edit, target);
            for occurrence in &occurrences {
                let date = shifted(occurrence.date(), delta);
                push_occurrence_update(&mut plan, occurrence.id, occurrence_changes(edit, date));
            }
            let mut changes = shared_metadata(edit);
            changes.amount = edit.amount;
            changes.status = edit.status;
            changes.notes = edit.notes.clone();
            if delta != TimeDelta::zero() {
                changes.start_date = shifted(payment.start_date, delta);
            }
            push_payment_update(&mut plan, payment.id, changes);
        }
        (MutationIntent::Delete, MutationScope::AllEvents) => {
            let decision = SeriesDecision::DeleteSeries;
            plan.operations = decision_operations(payment.id, &decision);
            plan.decision = Some(decision);
        }
    }

    debug!(operations = plan.operations.len(), "Planned mutation");
    plan
}

/// The operations that carry out a series decision.
pub fn decision_operations(payment_id: i32, decision: &SeriesDecision) -> Vec<Operation> {
    match decision {
        SeriesDecision::DeleteSeries => vec![Operation::DeletePayment { target: payment_id }],
        SeriesDecision::TruncateSeries { before, ids } => {
            let mut operations: Vec<Operation> = ids
                .iter()
                .map(|id| Operation::DeleteOccurrence { target: *id })
                .collect();
            operations.push(Operation::UpdatePayment {
                target: payment_id,
                changes: PaymentChanges {
                    end_date: before.checked_sub_days(Days::new(1)),
                    ..PaymentChanges::default()
                },
            });
            operations
        }
        SeriesDecision::DeleteOccurrences { ids } => ids
            .iter()
            .map(|id| Operation::DeleteOccurrence { target: *id })
            .collect(),
    }
}

fn direct_plan(payment: &RawPayment, intent: &MutationIntent) -> MutationPlan {
    let operation = match intent {
        MutationIntent::Delete => Operation::DeletePayment { target: payment.id },
        MutationIntent::Edit(edit) => {
            let mut changes = shared_metadata(edit);
            changes.amount = edit.amount;
            changes.status = edit.status;
            changes.notes = edit.notes.clone();
            if payment.is_recurring() {
                changes.start_date = edit.date;
            } else {
                changes.due_date = edit.date;
            }
            Operation::UpdatePayment {
                target: payment.id,
                changes,
            }
        }
    };

    MutationPlan {
        payment_id: payment.id,
        scope: MutationScope::OnlyEvent,
        operations: vec![operation],
        decision: None,
        anomalies: Vec::new(),
    }
}

/// Occurrences dated on or after the target's original date, plus the target itself.
///
/// Undated siblings are never selected. An undated target selects only itself.
fn forward_selection<'a>(occurrences: &[&'a Occurrence], target: &Occurrence) -> Vec<&'a Occurrence> {
    let cutoff = target.date();
    occurrences
        .iter()
        .copied()
        .filter(|occurrence| {
            occurrence.id == target.id
                || matches!((cutoff, occurrence.date()), (Some(cutoff), Some(date)) if date >= cutoff)
        })
        .collect()
}

fn forward_delete_decision(
    occurrences: &[&Occurrence],
    selected: &[&Occurrence],
    target: &Occurrence,
) -> SeriesDecision {
    let ids: Vec<i32> = selected.iter().map(|occurrence| occurrence.id).collect();
    if ids.len() == occurrences.len() {
        return SeriesDecision::DeleteSeries;
    }
    match target.date() {
        Some(before) => SeriesDecision::TruncateSeries { before, ids },
        None => SeriesDecision::DeleteOccurrences { ids },
    }
}

fn shift_delta(edit: &OccurrenceEdit, target: &Occurrence) -> TimeDelta {
    match (edit.date, target.date()) {
        (Some(new_date), Some(original)) => new_date.signed_duration_since(original),
        _ => TimeDelta::zero(),
    }
}

fn shifted(date: Option<NaiveDate>, delta: TimeDelta) -> Option<NaiveDate> {
    if delta == TimeDelta::zero() {
        return None;
    }
    date.and_then(|date| date.checked_add_signed(delta))
}

/// Shifted occurrences that land on or before one of the unshifted siblings.
///
/// The planner assumes a monotonic shift and leaves the dates as requested;
/// these are reported, not corrected.
fn shift_anomalies(
    occurrences: &[&Occurrence],
    selected: &[&Occurrence],
    delta: TimeDelta,
) -> Vec<ShiftAnomaly> {
    if delta >= TimeDelta::zero() {
        return Vec::new();
    }
    let unshifted: Vec<(i32, NaiveDate)> = occurrences
        .iter()
        .filter(|occurrence| !selected.iter().any(|chosen| chosen.id == occurrence.id))
        .filter_map(|occurrence| occurrence.date().map(|date| (occurrence.id, date)))
        .collect();

    selected
        .iter()
        .filter_map(|occurrence| {
            let original_date = occurrence.date()?;
            let shifted_date = original_date.checked_add_signed(delta)?;
            let (overtaken_occurrence_id, overtaken_date) = unshifted
                .iter()
                .filter(|(_, date)| *date < original_date && *date >= shifted_date)
                .max_by_key(|(id, date)| (*date, *id))
                .copied()?;
            Some(ShiftAnomaly {
                occurrence_id: occurrence.id,
                original_date,
                shifted_date,
                overtaken_occurrence_id,
                overtaken_date,
            })
        })
        .collect()
}

fn occurrence_changes(edit: &OccurrenceEdit, date: Option<NaiveDate>) -> OccurrenceChanges {
    OccurrenceChanges {
        scheduled_date: date,
        amount: edit.amount,
        status: edit.status,
        notes: edit.notes.clone(),
    }
}

fn shared_metadata(edit: &OccurrenceEdit) -> PaymentChanges {
    if !edit.has_shared_metadata() {
        return PaymentChanges::default();
    }
    PaymentChanges {
        description: edit.description.clone(),
        category: edit.category.clone(),
        category_id: edit.category_id,
        tag_ids: edit.tag_ids.clone(),
        ..PaymentChanges::default()
    }
}

fn push_occurrence_update(plan: &mut MutationPlan, target: i32, changes: OccurrenceChanges) {
    if changes != OccurrenceChanges::default() {
        plan.operations
            .push(Operation::UpdateOccurrence { target, changes });
    }
}

fn push_payment_update(plan: &mut MutationPlan, target: i32, changes: PaymentChanges) {
    if !changes.is_empty() {
        plan.operations.push(Operation::UpdatePayment { target, changes });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, dec, init_tracing, series};
    use model::{PaymentFrequency, PaymentStatus};

    fn payment() -> RawPayment {
        RawPayment::recurring(
            1,
            "Rent",
            dec(900).into(),
            PaymentFrequency::Monthly,
            date("2026-02-01"),
        )
    }

    fn occurrences() -> Vec<Occurrence> {
        series(1, 10, &["2026-02-01", "2026-03-01", "2026-04-01"])
    }

    fn move_to(day: &str) -> MutationIntent {
        MutationIntent::Edit(OccurrenceEdit {
            date: Some(date(day)),
            ..OccurrenceEdit::default()
        })
    }

    fn rescheduled(operations: &[Operation]) -> Vec<(i32, NaiveDate)> {
        operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::UpdateOccurrence { target, changes } => {
                    changes.scheduled_date.map(|date| (*target, date))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_forward_edit_shifts_by_the_same_delta() {
        init_tracing();
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[1]),
            &move_to("2026-03-15"),
            MutationScope::FromEventForward,
        );

        assert_eq!(
            rescheduled(&plan.operations),
            vec![(11, date("2026-03-15")), (12, date("2026-04-15"))]
        );
        assert_eq!(plan.operations.len(), 2);
        assert!(plan.anomalies.is_empty());
    }

    #[test]
    fn test_forward_delete_of_earliest_deletes_the_series() {
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[0]),
            &MutationIntent::Delete,
            MutationScope::FromEventForward,
        );

        assert_eq!(plan.decision, Some(SeriesDecision::DeleteSeries));
        assert_eq!(plan.operations, vec![Operation::DeletePayment { target: 1 }]);
    }

    #[test]
    fn test_forward_delete_equals_all_events_when_selection_is_everything() {
        let series = occurrences();

        let forward = plan_mutation(
            &payment(),
            &series,
            Some(&series[0]),
            &MutationIntent::Delete,
            MutationScope::FromEventForward,
        );
        let all = plan_mutation(
            &payment(),
            &series,
            Some(&series[2]),
            &MutationIntent::Delete,
            MutationScope::AllEvents,
        );

        assert_eq!(forward.operations, all.operations);
        assert_eq!(forward.decision, all.decision);
    }

    #[test]
    fn test_forward_delete_truncates_the_series() {
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[1]),
            &MutationIntent::Delete,
            MutationScope::FromEventForward,
        );

        assert_eq!(
            plan.decision,
            Some(SeriesDecision::TruncateSeries {
                before: date("2026-03-01"),
                ids: vec![11, 12],
            })
        );
        assert_eq!(
            plan.operations,
            vec![
                Operation::DeleteOccurrence { target: 11 },
                Operation::DeleteOccurrence { target: 12 },
                Operation::UpdatePayment {
                    target: 1,
                    changes: PaymentChanges {
                        end_date: Some(date("2026-02-28")),
                        ..PaymentChanges::default()
                    },
                },
            ]
        );
    }

    #[test]
    fn test_only_event_edit_touches_one_occurrence_and_parent_metadata() {
        let series = occurrences();
        let intent = MutationIntent::Edit(OccurrenceEdit {
            amount: Some(dec(950)),
            status: Some(PaymentStatus::Processed),
            description: Some("Rent (new lease)".to_string()),
            ..OccurrenceEdit::default()
        });

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[1]),
            &intent,
            MutationScope::OnlyEvent,
        );

        assert_eq!(
            plan.operations,
            vec![
                Operation::UpdateOccurrence {
                    target: 11,
                    changes: OccurrenceChanges {
                        amount: Some(dec(950)),
                        status: Some(PaymentStatus::Processed),
                        ..OccurrenceChanges::default()
                    },
                },
                Operation::UpdatePayment {
                    target: 1,
                    changes: PaymentChanges {
                        description: Some("Rent (new lease)".to_string()),
                        ..PaymentChanges::default()
                    },
                },
            ]
        );
    }

    #[test]
    fn test_only_event_edit_without_metadata_skips_parent() {
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[2]),
            &move_to("2026-04-03"),
            MutationScope::OnlyEvent,
        );

        assert_eq!(rescheduled(&plan.operations), vec![(12, date("2026-04-03"))]);
        assert_eq!(plan.operations.len(), 1);
    }

    #[test]
    fn test_only_event_delete() {
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[1]),
            &MutationIntent::Delete,
            MutationScope::OnlyEvent,
        );

        assert_eq!(plan.operations, vec![Operation::DeleteOccurrence { target: 11 }]);
        assert_eq!(
            plan.decision,
            Some(SeriesDecision::DeleteOccurrences { ids: vec![11] })
        );
    }

    #[test]
    fn test_all_events_edit_shifts_every_occurrence_and_the_start_date() {
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[1]),
            &move_to("2026-03-05"),
            MutationScope::AllEvents,
        );

        assert_eq!(
            rescheduled(&plan.operations),
            vec![
                (10, date("2026-02-05")),
                (11, date("2026-03-05")),
                (12, date("2026-04-05")),
            ]
        );
        assert_eq!(
            plan.operations.last(),
            Some(&Operation::UpdatePayment {
                target: 1,
                changes: PaymentChanges {
                    start_date: Some(date("2026-02-05")),
                    ..PaymentChanges::default()
                },
            })
        );
    }

    #[test]
    fn test_non_recurring_payment_ignores_scope() {
        let one_time = RawPayment::one_time(3, "Dentist", dec(120).into(), date("2026-05-02"));

        let deleted = plan_mutation(
            &one_time,
            &[],
            None,
            &MutationIntent::Delete,
            MutationScope::FromEventForward,
        );
        let edited = plan_mutation(
            &one_time,
            &[],
            None,
            &move_to("2026-05-09"),
            MutationScope::AllEvents,
        );

        assert_eq!(deleted.scope, MutationScope::OnlyEvent);
        assert_eq!(deleted.operations, vec![Operation::DeletePayment { target: 3 }]);
        assert_eq!(
            edited.operations,
            vec![Operation::UpdatePayment {
                target: 3,
                changes: PaymentChanges {
                    due_date: Some(date("2026-05-09")),
                    ..PaymentChanges::default()
                },
            }]
        );
    }

    #[test]
    fn test_backward_shift_that_overtakes_is_reported() {
        let series = occurrences();

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&series[1]),
            &move_to("2026-01-20"),
            MutationScope::FromEventForward,
        );

        assert_eq!(plan.anomalies.len(), 1);
        let anomaly = &plan.anomalies[0];
        assert_eq!(anomaly.occurrence_id, 11);
        assert_eq!(anomaly.shifted_date, date("2026-01-20"));
        assert_eq!(anomaly.overtaken_occurrence_id, 10);
        // The shift is still planned as requested.
        assert_eq!(
            rescheduled(&plan.operations),
            vec![(11, date("2026-01-20")), (12, date("2026-02-20"))]
        );
    }

    #[test]
    fn test_target_missing_from_series_is_included() {
        let series = occurrences();
        let stray = Occurrence::new(99, 1, date("2026-05-01"));

        let plan = plan_mutation(
            &payment(),
            &series,
            Some(&stray),
            &MutationIntent::Delete,
            MutationScope::FromEventForward,
        );

        assert_eq!(
            plan.decision,
            Some(SeriesDecision::TruncateSeries {
                before: date("2026-05-01"),
                ids: vec![99],
            })
        );
    }
}
