//! Panel file loading and command execution for the recordkit CLI.

use anyhow::{Context, Result};
use recordkit_crud::{CrudConfig, CrudPanel};
use recordkit_model::{Entity, FieldDescriptor};
use recordkit_storage::{Fixture, MemoryStore, StoredEntity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Everything needed to run an edit panel: which entity type it edits, its
/// configuration and field list, and the graph it reads and writes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PanelFile {
    pub entity_type: String,
    #[serde(default)]
    pub config: CrudConfig,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub graph: Fixture,
}

impl PanelFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read panel file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse panel file {}", path.display()))
    }
}

/// A loaded panel and the store behind it.
pub struct Session {
    pub panel: CrudPanel<StoredEntity>,
    pub store: MemoryStore,
}

impl Session {
    /// Builds the in-memory graph and wires a panel over it.
    pub fn open(file: PanelFile) -> Result<Self> {
        let store = MemoryStore::from_fixture(file.graph, &file.entity_type)
            .context("Failed to build entity graph")?;
        info!(
            "Opened panel for '{}' with {} fields",
            file.entity_type,
            file.fields.len()
        );

        let shared = Arc::new(store.clone());
        let panel = CrudPanel::new(shared.clone(), shared.clone(), shared, Arc::new(file.fields))
            .with_config(file.config);
        Ok(Self { panel, store })
    }

    /// The hydrated edit form for entry `id`, as JSON.
    pub fn edit(&self, id: &Value) -> Result<Value> {
        let fields = self
            .panel
            .get_update_fields(Some(id))
            .with_context(|| format!("Failed to load edit fields for {id}"))?;
        Ok(serde_json::to_value(&fields)?)
    }

    /// Applies `data` to entry `id` and returns the reloaded entry.
    pub fn update(&self, id: &Value, data: Map<String, Value>) -> Result<Value> {
        let updated = self
            .panel
            .update(id, data)
            .with_context(|| format!("Failed to update {id}"))?;
        let reloaded = self
            .store
            .get(updated.entity_type(), &updated.key())
            .unwrap_or(updated);
        Ok(reloaded.to_value())
    }
}

/// Interprets a key given on the command line: integers stay numeric,
/// anything else is a string key.
pub fn parse_key(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parses submitted form data, which must be a JSON object.
pub fn parse_data(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).context("Failed to parse update data")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("update data must be a JSON object, got {other}"),
    }
}
