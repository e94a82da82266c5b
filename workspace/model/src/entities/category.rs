use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The three kinds of money movement a category can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Income,
    Expense,
    Transfer,
}

impl CategoryType {
    /// Parses a category type, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "income" => Some(CategoryType::Income),
            "expense" => Some(CategoryType::Expense),
            "transfer" => Some(CategoryType::Transfer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
            CategoryType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-defined category metadata record.
///
/// `transaction_type` is kept as the raw string because user-entered data is
/// inconsistent; the classifier only trusts it when it parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub transaction_type: String,
    #[serde(default)]
    pub budget: Option<Decimal>,
}

impl Category {
    pub fn new(id: i32, name: &str, transaction_type: CategoryType) -> Self {
        Self {
            id,
            name: name.to_string(),
            transaction_type: transaction_type.as_str().to_string(),
            budget: None,
        }
    }

    /// The declared type, if it is one of the valid values.
    pub fn category_type(&self) -> Option<CategoryType> {
        CategoryType::parse(&self.transaction_type)
    }
}

/// Normalizes a category name into a lookup key.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Keyed access to category records by id and by name.
///
/// Name keys are trimmed and lower-cased, so "Groceries", " groceries" and
/// "GROCERIES" resolve to the same record. When two records share a key the
/// first one wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryLookup {
    by_id: HashMap<i32, Category>,
    by_name: HashMap<String, Category>,
}

impl CategoryLookup {
    pub fn new(categories: &[Category]) -> Self {
        let mut lookup = Self::default();
        for category in categories {
            lookup.by_id.entry(category.id).or_insert_with(|| category.clone());
            lookup
                .by_name
                .entry(name_key(&category.name))
                .or_insert_with(|| category.clone());
        }
        lookup
    }

    pub fn by_id(&self, id: i32) -> Option<&Category> {
        self.by_id.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Category> {
        self.by_name.get(&name_key(name))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// A filter over categories or accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Eq + Hash> {
    /// Everything passes.
    All,
    /// Only the listed items pass. An empty set lets nothing through.
    Only(HashSet<T>),
}

impl<T: Eq + Hash> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Eq + Hash> Selection<T> {
    pub fn only<I: IntoIterator<Item = T>>(items: I) -> Self {
        Selection::Only(items.into_iter().collect())
    }

    pub fn contains(&self, item: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(items) => items.contains(item),
        }
    }
}

impl Selection<String> {
    /// Builds a category selection, normalizing names the same way [`CategoryLookup`] does.
    pub fn categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Selection::Only(names.into_iter().map(|name| name_key(name.as_ref())).collect())
    }

    /// Case-insensitive membership test for category names.
    ///
    /// Items stored without normalization, as [`Selection::only`] keeps them, still match.
    pub fn contains_name(&self, name: &str) -> bool {
        let key = name_key(name);
        match self {
            Selection::All => true,
            Selection::Only(items) => {
                items.contains(&key) || items.iter().any(|item| name_key(item) == key)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_is_case_insensitive() {
        let lookup = CategoryLookup::new(&[
            Category::new(1, "Groceries", CategoryType::Expense),
            Category::new(2, "Salary", CategoryType::Income),
        ]);

        assert_eq!(lookup.by_name(" GROCERIES ").map(|c| c.id), Some(1));
        assert_eq!(lookup.by_id(2).map(|c| c.name.as_str()), Some("Salary"));
        assert!(lookup.by_name("Rent").is_none());
        assert_eq!(lookup.len(), 2);
        assert!(!lookup.is_empty());
        assert!(CategoryLookup::new(&[]).is_empty());
    }

    #[test]
    fn test_invalid_declared_type_is_ignored() {
        let category = Category {
            id: 3,
            name: "Misc".to_string(),
            transaction_type: "whatever".to_string(),
            budget: None,
        };
        assert_eq!(category.category_type(), None);
        assert_eq!(CategoryType::parse(" Income "), Some(CategoryType::Income));
    }

    #[test]
    fn test_category_selection() {
        let selection = Selection::categories(["Food", "Rent"]);

        assert!(selection.contains_name("food"));
        assert!(selection.contains_name("RENT"));
        assert!(!selection.contains_name("Travel"));
        assert!(Selection::<String>::All.contains_name("anything"));
        assert!(!Selection::<String>::only(Vec::new()).contains_name("food"));

        let raw = Selection::only(["Food".to_string(), " Rent ".to_string()]);
        assert!(raw.contains_name("food"));
        assert!(raw.contains_name("RENT"));
        assert!(!raw.contains_name("Travel"));
    }
}
