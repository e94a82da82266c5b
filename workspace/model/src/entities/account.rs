use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of account a payment can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    BankAccount,
    CreditCard,
    InvestmentAccount,
    /// External or unrecognized account types.
    #[serde(other)]
    Other,
}

/// A typed reference to one side of a payment.
///
/// The id is optional because the data store allows a typed but anonymous
/// counterpart (an external payee, for example).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    pub kind: AccountKind,
    pub id: Option<i32>,
}

impl AccountRef {
    pub fn new(kind: AccountKind, id: Option<i32>) -> Self {
        Self { kind, id }
    }

    pub fn is_bank(&self) -> bool {
        self.kind == AccountKind::BankAccount
    }

    pub fn is_investment(&self) -> bool {
        self.kind == AccountKind::InvestmentAccount
    }

    /// Returns true if this reference points at the given account.
    pub fn is(&self, kind: AccountKind, id: i32) -> bool {
        self.kind == kind && self.id == Some(id)
    }
}

/// A revolving credit account with a monthly billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: i32,
    pub name: String,
    pub credit_limit: Decimal,
    #[serde(default)]
    pub current_balance: Decimal,
    /// Day of month (1-31) on which the invoice closes.
    pub invoice_close_day: u32,
    /// Days after the close date on which payment is due.
    pub payment_due_day: u32,
    #[serde(default)]
    pub default_payment_account_id: Option<i32>,
}

impl CreditCard {
    /// Credit limit minus the current balance.
    pub fn available_credit(&self) -> Decimal {
        self.credit_limit - self.current_balance
    }

    /// Current balance as a percentage of the limit, zero when there is no limit.
    pub fn utilization_percentage(&self) -> Decimal {
        if self.credit_limit.is_zero() {
            return Decimal::ZERO;
        }
        self.current_balance / self.credit_limit * Decimal::ONE_HUNDRED
    }
}

/// An investment account with a known current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAccount {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub current_value: Decimal,
}
