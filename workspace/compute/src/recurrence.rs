use std::collections::HashSet;

use chrono::{Days, Duration, Months, NaiveDate};
use common::OccurrenceDraft;
use model::{OverrideKind, PaymentFrequency, PaymentStatus, RawPayment, RecurringPaymentOverride};
use rust_decimal::Decimal;
use tracing::{debug, instrument, trace};

/// Expansion horizon used when the caller does not pass one.
pub const DEFAULT_HORIZON_DAYS: u64 = 365;

/// The expansion end date `days` past `now`, saturating at the calendar's end.
pub fn horizon(now: NaiveDate, days: u64) -> NaiveDate {
    now.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// The n-th date of a series, counted from its start date.
///
/// Monthly and longer steps are anchored on the start day and clamped to the
/// length of the target month, so a series starting on the 31st lands on the
/// last day of shorter months without drifting.
pub fn nth_date(start: NaiveDate, frequency: PaymentFrequency, n: u32) -> Option<NaiveDate> {
    match frequency {
        PaymentFrequency::Daily => start.checked_add_signed(Duration::days(i64::from(n))),
        PaymentFrequency::Weekly => start.checked_add_signed(Duration::weeks(i64::from(n))),
        PaymentFrequency::Monthly => start.checked_add_months(Months::new(n)),
        PaymentFrequency::Quarterly => start.checked_add_months(Months::new(n.checked_mul(3)?)),
        PaymentFrequency::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
    }
}

/// Expands a recurring payment into drafts for every missing date up to `up_to`.
///
/// Dates already present in `existing_dates` are skipped. Active overrides for
/// the payment apply per date: `skip` and `cancel` drop it, `change_amount`
/// replaces the amount and `change_date` moves the due date. Inactive or
/// one-time payments, and payments without a start date or frequency,
/// produce nothing.
#[instrument(skip(payment, existing_dates, overrides), fields(payment_id = payment.id, up_to = %up_to))]
pub fn generate_occurrences(
    payment: &RawPayment,
    up_to: NaiveDate,
    existing_dates: &HashSet<NaiveDate>,
    overrides: &[RecurringPaymentOverride],
) -> Vec<OccurrenceDraft> {
    if !payment.is_recurring() || !payment.is_active {
        return Vec::new();
    }
    let (Some(start), Some(frequency)) = (payment.start_date, payment.frequency) else {
        debug!("Recurring payment has no start date or frequency");
        return Vec::new();
    };

    let last = payment.end_date.map_or(up_to, |end| end.min(up_to));
    let amount = payment
        .amount
        .as_ref()
        .and_then(|amount| amount.to_decimal())
        .unwrap_or(Decimal::ZERO);
    let overrides: Vec<&RecurringPaymentOverride> = overrides
        .iter()
        .filter(|item| item.is_active && item.payment_id == payment.id)
        .collect();

    let mut drafts = Vec::new();
    let mut n = 0;
    while let Some(date) = nth_date(start, frequency, n) {
        if date > last {
            break;
        }
        n += 1;
        if existing_dates.contains(&date) {
            continue;
        }

        let mut draft = OccurrenceDraft {
            payment_id: payment.id,
            scheduled_date: date,
            due_date: date,
            amount,
            status: PaymentStatus::Scheduled,
        };
        let mut skipped = false;
        for item in overrides.iter().filter(|item| item.affects(date)) {
            match item.override_type {
                OverrideKind::Skip | OverrideKind::Cancel => {
                    skipped = true;
                    break;
                }
                OverrideKind::ChangeAmount => {
                    if let Some(new_amount) = item.new_amount {
                        draft.amount = new_amount;
                    }
                }
                OverrideKind::ChangeDate => {
                    if let Some(new_due_date) = item.new_due_date {
                        draft.due_date = new_due_date;
                    }
                }
            }
        }
        if skipped {
            trace!(%date, "Skipped by override");
            continue;
        }
        drafts.push(draft);
    }

    debug!(drafts = drafts.len(), "Expanded recurring payment");
    drafts
}
