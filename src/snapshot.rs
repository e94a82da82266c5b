use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use compute::NormalizedLedger;
use model::{
    Category, CategoryLookup, CreditCard, InvestmentAccount, Occurrence, RawPayment,
    RecurringPaymentOverride,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Serialization format of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// YAML for `.yaml` and `.yml` files, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("yaml" | "yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }
}

/// Everything the data store handed over for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub payments: Vec<RawPayment>,
    /// Occurrences of each recurring payment, keyed by payment id.
    #[serde(default)]
    pub occurrences: HashMap<i32, Vec<Occurrence>>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
    #[serde(default)]
    pub investment_accounts: Vec<InvestmentAccount>,
    #[serde(default)]
    pub overrides: Vec<RecurringPaymentOverride>,
}

impl Snapshot {
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Self::parse(&text, SnapshotFormat::from_path(path))
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        info!(
            payments = snapshot.payments.len(),
            series = snapshot.occurrences.len(),
            categories = snapshot.categories.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn parse(text: &str, format: SnapshotFormat) -> Result<Self> {
        let snapshot = match format {
            SnapshotFormat::Json => serde_json::from_str(text)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(snapshot)
    }

    pub fn lookup(&self) -> CategoryLookup {
        CategoryLookup::new(&self.categories)
    }

    pub fn ledger(&self) -> NormalizedLedger {
        compute::normalize(&self.payments, &self.occurrences, &self.lookup())
    }

    pub fn payment(&self, id: i32) -> Option<&RawPayment> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    /// Fetched occurrences of a payment, empty when none were fetched.
    pub fn series(&self, payment_id: i32) -> &[Occurrence] {
        self.occurrences
            .get(&payment_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn credit_card(&self, id: i32) -> Option<&CreditCard> {
        self.credit_cards.iter().find(|card| card.id == id)
    }
}
