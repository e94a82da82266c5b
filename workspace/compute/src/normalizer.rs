use std::collections::HashMap;

use common::NormalizationDiagnostics;
use model::{CategoryLookup, EntryId, LedgerEntry, Occurrence, RawAmount, RawPayment};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::classifier::{self, Classification};

/// The flat ledger produced from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct NormalizedLedger {
    /// Ordered by date, undated entries last, ties broken by id.
    pub entries: Vec<LedgerEntry>,
    pub diagnostics: NormalizationDiagnostics,
}

/// Expands payments into ledger entries.
///
/// A one-time payment yields exactly one entry. A recurring payment yields one
/// entry per occurrence fetched for it, none if nothing was fetched. Occurrence
/// date, amount and status take precedence over the parent's; category,
/// accounts and tags come from the parent.
///
/// Non-numeric or missing amounts become zero and undated entries are kept
/// without a date. Both are counted in the returned diagnostics.
#[instrument(skip_all, fields(payments = payments.len(), series = occurrences.len()))]
pub fn normalize(
    payments: &[RawPayment],
    occurrences: &HashMap<i32, Vec<Occurrence>>,
    lookup: &CategoryLookup,
) -> NormalizedLedger {
    let mut ledger = NormalizedLedger::default();
    if lookup.is_empty() {
        debug!("No category records, classifying by payment fields only");
    } else {
        debug!(categories = lookup.len(), "Classifying against category records");
    }

    for payment in payments {
        let classification = classifier::classify(payment, lookup);

        if !payment.is_recurring() {
            let amount = resolve_amount(payment.amount.as_ref(), payment, &mut ledger.diagnostics);
            let entry = base_entry(payment, &classification, EntryId::Payment(payment.id), amount);
            ledger.push(LedgerEntry {
                due_date: payment.due_date,
                status: payment.status,
                ..entry
            });
            continue;
        }

        let fetched = occurrences.get(&payment.id).map(Vec::as_slice).unwrap_or(&[]);
        if fetched.is_empty() {
            debug!(payment_id = payment.id, "Recurring payment has no fetched occurrences");
            ledger.diagnostics.recurring_without_occurrences += 1;
            continue;
        }

        for occurrence in fetched {
            let amount = resolve_amount(
                occurrence.amount.as_ref().or(payment.amount.as_ref()),
                payment,
                &mut ledger.diagnostics,
            );
            let id = EntryId::Occurrence {
                payment_id: payment.id,
                occurrence_id: occurrence.id,
            };
            let mut entry = base_entry(payment, &classification, id, amount);
            entry.due_date = occurrence.date();
            entry.status = occurrence.status;
            if let Some(tag) = occurrence.notes.as_deref().and_then(classifier::subcategory_tag) {
                entry.subcategory = Some(tag);
            }
            ledger.push(entry);
        }
    }

    ledger
        .entries
        .sort_by_key(|entry| (entry.due_date.is_none(), entry.due_date, entry.id));

    if !ledger.diagnostics.is_clean() {
        warn!(
            coerced_amounts = ledger.diagnostics.coerced_amounts,
            undated_entries = ledger.diagnostics.undated_entries,
            recurring_without_occurrences = ledger.diagnostics.recurring_without_occurrences,
            "Snapshot normalized with data-quality degradations"
        );
    }
    info!(entries = ledger.entries.len(), "Normalized ledger");

    ledger
}

impl NormalizedLedger {
    fn push(&mut self, entry: LedgerEntry) {
        if entry.due_date.is_none() {
            debug!(entry = %entry.id, "Ledger entry has no usable date");
            self.diagnostics.undated_entries += 1;
        }
        self.entries.push(entry);
    }
}

fn resolve_amount(
    amount: Option<&RawAmount>,
    payment: &RawPayment,
    diagnostics: &mut NormalizationDiagnostics,
) -> Decimal {
    match amount.and_then(RawAmount::to_decimal) {
        Some(value) => value,
        None => {
            warn!(payment_id = payment.id, raw = ?amount, "Coercing non-numeric amount to zero");
            diagnostics.coerced_amounts += 1;
            Decimal::ZERO
        }
    }
}

fn base_entry(
    payment: &RawPayment,
    classification: &Classification,
    id: EntryId,
    amount: Decimal,
) -> LedgerEntry {
    LedgerEntry {
        description: payment.description.clone(),
        currency: payment.currency.clone(),
        subcategory: classification.subcategory.clone(),
        from_account: payment.from_account(),
        to_account: payment.to_account(),
        tag_ids: payment.tag_ids.clone(),
        ..LedgerEntry::new(
            id,
            None,
            amount,
            payment.status,
            &classification.category_name,
            classification.kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, dec, init_tracing, series};
    use model::{AccountKind, Category, CategoryType, PaymentFrequency, PaymentStatus};

    fn lookup() -> CategoryLookup {
        CategoryLookup::new(&[Category::new(7, "Rent", CategoryType::Expense)])
    }

    #[test]
    fn test_one_time_payment_yields_one_entry() {
        let payment = RawPayment::one_time(3, "Dentist", dec(120).into(), date("2026-02-14"))
            .with_status(PaymentStatus::Processed)
            .with_from_account(AccountKind::BankAccount, 1);

        let ledger = normalize(&[payment], &HashMap::new(), &lookup());

        assert_eq!(ledger.entries.len(), 1);
        let entry = &ledger.entries[0];
        assert_eq!(entry.id, EntryId::Payment(3));
        assert_eq!(entry.id.to_string(), "p-3");
        assert_eq!(entry.amount, dec(120));
        assert_eq!(entry.due_date, Some(date("2026-02-14")));
        assert_eq!(entry.status, PaymentStatus::Processed);
        assert_eq!(entry.category_type, CategoryType::Expense);
        assert!(ledger.diagnostics.is_clean());
    }

    #[test]
    fn test_recurring_payment_yields_one_entry_per_occurrence() {
        let mut payment = RawPayment::recurring(
            5,
            "Rent",
            dec(900).into(),
            PaymentFrequency::Monthly,
            date("2026-01-01"),
        )
        .with_status(PaymentStatus::Pending);
        payment.category_id = Some(7);

        let mut occurrences = series(5, 10, &["2026-01-01", "2026-02-01", "2026-03-01"]);
        occurrences[0].status = PaymentStatus::Reconciled;
        occurrences[1].amount = Some(dec(950).into());

        let ledger = normalize(
            &[payment],
            &HashMap::from([(5, occurrences)]),
            &lookup(),
        );

        assert_eq!(ledger.entries.len(), 3);
        assert_eq!(ledger.entries[0].id.to_string(), "o-5-10");
        assert_eq!(ledger.entries[0].status, PaymentStatus::Reconciled);
        assert_eq!(ledger.entries[0].amount, dec(900));
        assert_eq!(ledger.entries[1].amount, dec(950));
        assert_eq!(ledger.entries[2].status, PaymentStatus::Scheduled);
        assert_eq!(ledger.entries[2].due_date, Some(date("2026-03-01")));
        assert!(ledger.entries.iter().all(|entry| entry.category_name == "Rent"));
    }

    #[test]
    fn test_recurring_payment_without_occurrences_yields_nothing() {
        init_tracing();
        let payment = RawPayment::recurring(
            5,
            "Gym",
            dec(30).into(),
            PaymentFrequency::Monthly,
            date("2026-01-01"),
        );

        let ledger = normalize(&[payment], &HashMap::from([(5, Vec::new())]), &lookup());

        assert!(ledger.entries.is_empty());
        assert_eq!(ledger.diagnostics.recurring_without_occurrences, 1);
    }

    #[test]
    fn test_malformed_amount_becomes_zero_and_is_counted() {
        let mut payment = RawPayment::one_time(1, "Odd", "abc".into(), date("2026-01-03"));
        let mut missing = RawPayment::one_time(2, "Missing", dec(0).into(), date("2026-01-04"));
        missing.amount = None;
        payment.due_date = None;

        let ledger = normalize(&[payment, missing], &HashMap::new(), &lookup());

        assert_eq!(ledger.entries.len(), 2);
        assert!(ledger.entries.iter().all(|entry| entry.amount == Decimal::ZERO));
        assert_eq!(ledger.diagnostics.coerced_amounts, 2);
        assert_eq!(ledger.diagnostics.undated_entries, 1);
        // Undated entries sort last.
        assert_eq!(ledger.entries[1].id, EntryId::Payment(1));
    }

    #[test]
    fn test_occurrence_notes_override_subcategory() {
        let mut payment = RawPayment::recurring(
            8,
            "Food",
            dec(40).into(),
            PaymentFrequency::Weekly,
            date("2026-01-01"),
        );
        payment.notes = Some("[subcategory:Groceries]".to_string());
        let mut occurrences = series(8, 1, &["2026-01-01", "2026-01-08"]);
        occurrences[1].notes = Some("[subcategory:Takeaway]".to_string());

        let ledger = normalize(&[payment], &HashMap::from([(8, occurrences)]), &lookup());

        assert_eq!(ledger.entries[0].subcategory.as_deref(), Some("Groceries"));
        assert_eq!(ledger.entries[1].subcategory.as_deref(), Some("Takeaway"));
    }
}
