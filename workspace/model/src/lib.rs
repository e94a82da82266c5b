//! Plain data types exchanged with the external data store.
//!
//! Nothing in here talks to storage: payments, occurrences, categories and
//! accounts arrive as already-fetched collections and are read-only to the
//! engine. The derived [`transaction::LedgerEntry`] also lives here so that
//! both the compute and common crates can name it.

pub mod entities;
pub mod lenient;
pub mod transaction;

// Re-export tracing for use in this crate
pub use tracing;

pub use entities::{
    AccountKind, AccountRef, Category, CategoryLookup, CategoryType, CreditCard,
    InvestmentAccount, Occurrence, OverrideKind, PaymentFrequency, PaymentStatus, PaymentType,
    RawPayment, RecurringPaymentOverride, Selection,
};
pub use lenient::RawAmount;
pub use transaction::{EntryId, LedgerEntry};
