//! Output records and the builder that expands hostnames into them.

use serde::{Deserialize, Serialize};

/// Column order of every tabular artifact.
pub const COLUMNS: [&str; 6] = [
    "entry",
    "category",
    "action",
    "description",
    "risk",
    "is_enabled",
];

/// What a consumer should do with an entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Block,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Block => f.write_str("block"),
        }
    }
}

/// One row of the dataset. Field order is the column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AggregatedRecord {
    pub entry: String,
    pub category: String,
    pub action: Action,
    pub description: String,
    pub risk: String,
    pub is_enabled: bool,
}

/// Values applied to every record of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecordDefaults {
    /// Risk label written to every row (empty by default)
    pub risk: String,
    /// Whether rows are emitted enabled
    pub is_enabled: bool,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            risk: String::new(),
            is_enabled: true,
        }
    }
}

/// Expands `(hostname, category)` pairs into full records.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    defaults: RecordDefaults,
}

impl RecordBuilder {
    pub fn new(defaults: RecordDefaults) -> Self {
        Self { defaults }
    }

    pub fn build(&self, entry: String, category: &str) -> AggregatedRecord {
        AggregatedRecord {
            entry,
            category: category.to_string(),
            action: Action::Block,
            description: describe(category),
            risk: self.defaults.risk.clone(),
            is_enabled: self.defaults.is_enabled,
        }
    }
}

/// Description text for a category, e.g. `Blocked gambling domain`.
pub fn describe(category: &str) -> String {
    format!("Blocked {} domain", category.to_lowercase())
}
