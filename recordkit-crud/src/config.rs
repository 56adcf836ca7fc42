use serde::{Deserialize, Serialize};

/// Default column fake fields are packed into.
pub const DEFAULT_FAKE_COLUMN: &str = "extras";

/// Configuration for a [`CrudPanel`](crate::CrudPanel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    /// Column fake fields land in when they name no `store_in`.
    pub fake_column: String,
    /// Attributes the entity stores as native JSON. Submitted string values
    /// for these are decoded, and fake columns listed here are not re-encoded.
    pub json_columns: Vec<String>,
}

impl CrudConfig {
    /// True if `column` holds native JSON.
    pub fn is_json_column(&self, column: &str) -> bool {
        self.json_columns.iter().any(|c| c == column)
    }
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            fake_column: DEFAULT_FAKE_COLUMN.to_string(),
            json_columns: Vec::new(),
        }
    }
}
