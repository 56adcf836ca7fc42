use crate::memory::{Graph, SharedGraph};
use crate::relation::{keys_match, RelationKind};
use recordkit_model::{Entity, Related};
use serde_json::{Map, Value};

/// A record loaded from a [`MemoryStore`](crate::MemoryStore).
///
/// Attributes are a detached copy; relations are looked up lazily against
/// the shared graph each time an accessor is invoked.
#[derive(Debug, Clone)]
pub struct StoredEntity {
    graph: SharedGraph,
    entity_type: String,
    key_name: String,
    attributes: Map<String, Value>,
    pivot: Option<Map<String, Value>>,
}

impl StoredEntity {
    pub(crate) fn new(
        graph: SharedGraph,
        entity_type: &str,
        key_name: &str,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            graph,
            entity_type: entity_type.to_string(),
            key_name: key_name.to_string(),
            attributes,
            pivot: None,
        }
    }

    fn with_pivot(mut self, pivot: Map<String, Value>) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// The record's attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Pivot attributes of the join row this record was reached through.
    pub fn pivot_attributes(&self) -> Option<&Map<String, Value>> {
        self.pivot.as_ref()
    }

    fn load(&self, graph: &Graph, entity_type: &str, key: &Value) -> Option<Self> {
        let table = graph.tables.get(entity_type)?;
        let record = table.find(key)?;
        Some(Self::new(
            self.graph.clone(),
            entity_type,
            &table.key_name,
            record.clone(),
        ))
    }
}

impl Entity for StoredEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn key_name(&self) -> &str {
        &self.key_name
    }

    fn attribute(&self, name: &str) -> Value {
        self.attributes.get(name).cloned().unwrap_or(Value::Null)
    }

    fn relation(&self, name: &str) -> Option<Related<Self>> {
        let graph = self.graph.read();
        let def = graph.relation(&self.entity_type, name)?;
        let key = self.key();

        let related = match def.kind {
            RelationKind::HasOne => {
                let fk = def.foreign_key();
                graph
                    .tables
                    .get(&def.related)
                    .and_then(|t| {
                        t.records
                            .iter()
                            .find(|r| r.get(&fk).is_some_and(|v| keys_match(v, &key)))
                    })
                    .map(|record| {
                        let key_name = graph.key_name(&def.related);
                        Self::new(self.graph.clone(), &def.related, &key_name, record.clone())
                    })
                    .map_or(Related::OneEmpty, Related::One)
            }
            RelationKind::BelongsTo => {
                let fk_value = self.attribute(&def.foreign_key());
                self.load(&graph, &def.related, &fk_value)
                    .map_or(Related::OneEmpty, Related::One)
            }
            RelationKind::HasMany => {
                let fk = def.foreign_key();
                let key_name = graph.key_name(&def.related);
                let items = graph
                    .tables
                    .get(&def.related)
                    .map(|t| {
                        t.records
                            .iter()
                            .filter(|r| r.get(&fk).is_some_and(|v| keys_match(v, &key)))
                            .map(|r| {
                                Self::new(self.graph.clone(), &def.related, &key_name, r.clone())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Related::Many(items)
            }
            RelationKind::BelongsToMany => {
                let items = graph
                    .pivot_rows(&self.entity_type, name, &key)
                    .filter_map(|row| {
                        self.load(&graph, &def.related, &row.related)
                            .map(|e| e.with_pivot(row.attributes.clone()))
                    })
                    .collect();
                Related::Many(items)
            }
        };
        Some(related)
    }

    fn pivot(&self, name: &str) -> Value {
        self.pivot
            .as_ref()
            .and_then(|p| p.get(name))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Keys naming a relation of this entity type are not attributes. A
    /// belongs-to value sets the foreign key; other relations are skipped.
    fn fill(&mut self, attributes: &Map<String, Value>) {
        let graph = self.graph.read();
        for (name, value) in attributes {
            match graph.relation(&self.entity_type, name) {
                Some(def) if def.kind == RelationKind::BelongsTo => {
                    self.attributes
                        .insert(def.foreign_key(), graph.owner_key(def, value));
                }
                Some(_) => {}
                None => {
                    self.attributes.insert(name.clone(), value.clone());
                }
            }
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}
