pub mod account;
pub mod category;
pub mod occurrence;
pub mod payment;
pub mod recurring_override;

pub use account::{AccountKind, AccountRef, CreditCard, InvestmentAccount};
pub use category::{Category, CategoryLookup, CategoryType, Selection};
pub use occurrence::Occurrence;
pub use payment::{PaymentFrequency, PaymentStatus, PaymentType, RawPayment};
pub use recurring_override::{OverrideKind, RecurringPaymentOverride};
