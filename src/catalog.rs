use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::validate_label;

/// Static mapping from class label to monetary value.
///
/// Unknown labels map to value 0 and can never trigger accumulation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BanknoteCatalog {
    values: BTreeMap<String, u64>,
}

impl Default for BanknoteCatalog {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        for (label, value) in [
            ("oneDollar", 1),
            ("fiveDollar", 5),
            ("tenDollar", 10),
            ("twentyDollar", 20),
            ("fiftyDollar", 50),
            ("hundredDollar", 100),
        ] {
            values.insert(label.to_string(), value);
        }
        Self { values }
    }
}

impl BanknoteCatalog {
    /// Build a catalog from explicit label/value pairs.
    ///
    /// Labels must conform to the label allowlist and values must be
    /// positive; a zero value would make the note indistinguishable from
    /// an unknown label.
    pub fn from_values(values: BTreeMap<String, u64>) -> Result<Self> {
        if values.is_empty() {
            return Err(anyhow!("catalog must contain at least one banknote"));
        }
        for (label, value) in &values {
            validate_label(label)?;
            if *value == 0 {
                return Err(anyhow!("catalog value for {:?} must be > 0", label));
            }
        }
        Ok(Self { values })
    }

    /// Monetary value for a label, 0 when unknown.
    pub fn value_of(&self, label: &str) -> u64 {
        self.values.get(label).copied().unwrap_or(0)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.values.contains_key(label)
    }

    /// Known banknote labels in deterministic order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
