//! Resolves a payment's category reference to income, expense or transfer.
//!
//! Category metadata is optional and user-entered data is inconsistent, so
//! resolution falls through a chain of weaker signals:
//!
//! 1. A category record found by id or by lower-cased name, if its declared type is valid.
//! 2. The raw category string itself, when it is literally `income`, `expense` or `transfer`.
//! 3. Account linkage: money entering a bank account from elsewhere is income,
//!    money leaving a bank account for elsewhere is an expense.
//! 4. Expense.

use model::{CategoryLookup, CategoryType, RawPayment};
use tracing::trace;

/// Name given to entries without any usable category reference.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

const SUBCATEGORY_KEY: &str = "subcategory:";

/// The outcome of classifying one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: CategoryType,
    /// Display name of the category: the record's name, else the raw reference.
    pub category_name: String,
    /// Child category extracted from a `[subcategory:Name]` tag in the notes.
    pub subcategory: Option<String>,
}

/// Classifies a payment against the given category lookup.
pub fn classify(payment: &RawPayment, lookup: &CategoryLookup) -> Classification {
    let raw_name = payment
        .category
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let record = payment
        .category_id
        .and_then(|id| lookup.by_id(id))
        .or_else(|| raw_name.and_then(|name| lookup.by_name(name)));

    let category_name = record
        .map(|category| category.name.clone())
        .or_else(|| raw_name.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let kind = record
        .and_then(|category| category.category_type())
        .or_else(|| raw_name.and_then(CategoryType::parse))
        .or_else(|| kind_from_accounts(payment))
        .unwrap_or(CategoryType::Expense);

    trace!(
        payment_id = payment.id,
        category = %category_name,
        kind = %kind,
        from_record = record.is_some(),
        "Classified payment"
    );

    Classification {
        kind,
        category_name,
        subcategory: payment.notes.as_deref().and_then(subcategory_tag),
    }
}

fn kind_from_accounts(payment: &RawPayment) -> Option<CategoryType> {
    let from_bank = payment.from_account().is_some_and(|account| account.is_bank());
    let to_bank = payment.to_account().is_some_and(|account| account.is_bank());

    match (from_bank, to_bank) {
        (false, true) => Some(CategoryType::Income),
        (true, false) => Some(CategoryType::Expense),
        _ => None,
    }
}

/// Extracts the child category from a `[subcategory:Name]` tag.
///
/// The key is matched case-insensitively; the name keeps its case.
pub fn subcategory_tag(notes: &str) -> Option<String> {
    let mut rest = notes;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let close = after.find(']')?;
        let inner = after[..close].trim();
        if let Some(key) = inner.get(..SUBCATEGORY_KEY.len()) {
            if key.eq_ignore_ascii_case(SUBCATEGORY_KEY) {
                let name = inner[SUBCATEGORY_KEY.len()..].trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
        rest = &after[close + 1..];
    }
    None
}
