//! Builders shared by the compute tests.

use chrono::NaiveDate;
use model::{AccountKind, CategoryType, EntryId, LedgerEntry, Occurrence, PaymentStatus};
use rust_decimal::Decimal;

/// Routes engine logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("compute=debug")
        .with_test_writer()
        .try_init();
}

pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

pub fn dec(amount: i64) -> Decimal {
    Decimal::from(amount)
}

pub fn entry(
    id: i32,
    day: &str,
    amount: i64,
    status: PaymentStatus,
    category: &str,
    kind: CategoryType,
) -> LedgerEntry {
    LedgerEntry::new(
        EntryId::Payment(id),
        Some(date(day)),
        dec(amount),
        status,
        category,
        kind,
    )
}

pub fn expense(id: i32, day: &str, amount: i64, status: PaymentStatus) -> LedgerEntry {
    entry(id, day, amount, status, "General", CategoryType::Expense)
}

pub fn income(id: i32, day: &str, amount: i64, status: PaymentStatus) -> LedgerEntry {
    entry(id, day, amount, status, "Salary", CategoryType::Income)
}

/// A transfer from a bank account into an investment account.
pub fn contribution(id: i32, day: &str, amount: i64, account_id: i32) -> LedgerEntry {
    entry(
        id,
        day,
        amount,
        PaymentStatus::Processed,
        "Investing",
        CategoryType::Transfer,
    )
    .with_from_account(AccountKind::BankAccount, 1)
    .with_to_account(AccountKind::InvestmentAccount, account_id)
}

/// A transfer out of an investment account into a bank account.
pub fn withdrawal(id: i32, day: &str, amount: i64, account_id: i32) -> LedgerEntry {
    entry(
        id,
        day,
        amount,
        PaymentStatus::Processed,
        "Investing",
        CategoryType::Transfer,
    )
    .with_from_account(AccountKind::InvestmentAccount, account_id)
    .with_to_account(AccountKind::BankAccount, 1)
}

/// A purchase charged to a credit card.
pub fn card_charge(id: i32, day: &str, amount: i64, card_id: i32) -> LedgerEntry {
    expense(id, day, amount, PaymentStatus::Processed)
        .with_from_account(AccountKind::CreditCard, card_id)
}

/// A payment from a bank account against a credit card.
pub fn card_payment(
    id: i32,
    day: &str,
    amount: i64,
    card_id: i32,
    status: PaymentStatus,
) -> LedgerEntry {
    entry(id, day, amount, status, "Card payment", CategoryType::Transfer)
        .with_from_account(AccountKind::BankAccount, 1)
        .with_to_account(AccountKind::CreditCard, card_id)
}

/// Occurrences of one series, numbered from `first_id` in date order.
pub fn series(payment_id: i32, first_id: i32, days: &[&str]) -> Vec<Occurrence> {
    days.iter()
        .enumerate()
        .map(|(offset, day)| Occurrence::new(first_id + offset as i32, payment_id, date(day)))
        .collect()
}
