use crate::memory::DEFAULT_KEY_NAME;
use crate::relation::RelationDef;
use recordkit_model::StoreResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Serialized description of an entity graph.
///
/// ```json
/// {
///   "entities": { "article": { "key_name": "id", "records": [{ "id": 1, "title": "Hi" }] } },
///   "relations": [{ "entity": "article", "name": "tags", "kind": "belongs_to_many", "related": "tag" }],
///   "pivots": [{ "entity": "article", "relation": "tags", "parent": 1, "related": 7, "attributes": { "weight": 2 } }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub entities: BTreeMap<String, TableFixture>,
    #[serde(default)]
    pub relations: Vec<RelationDef>,
    #[serde(default)]
    pub pivots: Vec<PivotFixture>,
}

/// Records of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFixture {
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default)]
    pub records: Vec<Map<String, Value>>,
}

/// One join row of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotFixture {
    pub entity: String,
    pub relation: String,
    pub parent: Value,
    pub related: Value,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

fn default_key_name() -> String {
    DEFAULT_KEY_NAME.to_string()
}

impl Fixture {
    /// Parses a fixture from JSON text.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a fixture file.
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            recordkit_model::StoreError::Backend(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }
}
