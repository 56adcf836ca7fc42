//! In-memory entity graph.
//!
//! Records live in per-type tables keyed by their key attribute. Relations
//! are declared per entity type and resolved on access; many-to-many links
//! are join rows carrying pivot attributes.

use crate::entity::StoredEntity;
use crate::fixture::Fixture;
use crate::relation::{key_string, keys_match, RelationDef, RelationKind};
use recordkit_model::{
    Entity, EntityStore, RelationMetadata, RelationPersister, StoreError, StoreResult,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// Default key attribute name.
pub const DEFAULT_KEY_NAME: &str = "id";

#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) key_name: String,
    pub(crate) records: Vec<Map<String, Value>>,
}

impl Table {
    fn new(key_name: &str) -> Self {
        Self {
            key_name: key_name.to_string(),
            records: Vec::new(),
        }
    }

    pub(crate) fn find(&self, key: &Value) -> Option<&Map<String, Value>> {
        self.records
            .iter()
            .find(|r| r.get(&self.key_name).is_some_and(|k| keys_match(k, key)))
    }

    fn find_mut(&mut self, key: &Value) -> Option<&mut Map<String, Value>> {
        let key_name = &self.key_name;
        self.records
            .iter_mut()
            .find(|r| r.get(key_name).is_some_and(|k| keys_match(k, key)))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PivotRow {
    pub(crate) entity: String,
    pub(crate) relation: String,
    pub(crate) parent: Value,
    pub(crate) related: Value,
    pub(crate) attributes: Map<String, Value>,
}

#[derive(Debug, Default)]
pub(crate) struct Graph {
    pub(crate) tables: BTreeMap<String, Table>,
    pub(crate) relations: Vec<RelationDef>,
    pub(crate) pivots: Vec<PivotRow>,
}

impl Graph {
    pub(crate) fn relation(&self, entity_type: &str, name: &str) -> Option<&RelationDef> {
        self.relations
            .iter()
            .find(|r| r.entity == entity_type && r.name == name)
    }

    pub(crate) fn key_name(&self, entity_type: &str) -> String {
        self.tables
            .get(entity_type)
            .map(|t| t.key_name.clone())
            .unwrap_or_else(|| DEFAULT_KEY_NAME.to_string())
    }

    pub(crate) fn pivot_rows<'a>(
        &'a self,
        entity_type: &'a str,
        relation: &'a str,
        parent: &'a Value,
    ) -> impl Iterator<Item = &'a PivotRow> + 'a {
        self.pivots.iter().filter(move |row| {
            row.entity == entity_type && row.relation == relation && keys_match(&row.parent, parent)
        })
    }

    fn table_mut(&mut self, entity_type: &str) -> StoreResult<&mut Table> {
        self.tables
            .get_mut(entity_type)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown entity type: {entity_type}")))
    }

    fn insert(
        &mut self,
        entity_type: &str,
        mut attributes: Map<String, Value>,
    ) -> StoreResult<Value> {
        let table = self
            .tables
            .entry(entity_type.to_string())
            .or_insert_with(|| Table::new(DEFAULT_KEY_NAME));

        let key = match attributes.get(&table.key_name) {
            Some(key) if !key.is_null() => key.clone(),
            _ => {
                let key = Value::String(Uuid::now_v7().to_string());
                attributes.insert(table.key_name.clone(), key.clone());
                key
            }
        };
        if table.find(&key).is_some() {
            return Err(StoreError::InvalidData(format!(
                "duplicate key {} for {entity_type}",
                key_string(&key)
            )));
        }

        table.records.push(attributes);
        Ok(key)
    }

    /// Replaces the join rows of `parent` under `def` (sync).
    fn sync_pivots(&mut self, def: &RelationDef, parent: &Value, value: &Value) -> StoreResult<()> {
        let rows = pivot_rows_from_input(&def.name, value)?;
        self.pivots.retain(|row| {
            !(row.entity == def.entity
                && row.relation == def.name
                && keys_match(&row.parent, parent))
        });
        debug!("Syncing {} rows for {}.{}", rows.len(), def.entity, def.name);
        for (related, attributes) in rows {
            self.pivots.push(PivotRow {
                entity: def.entity.clone(),
                relation: def.name.clone(),
                parent: parent.clone(),
                related,
                attributes,
            });
        }
        Ok(())
    }

    /// Key of the owner submitted for a belongs-to relation: the value itself,
    /// or the key attribute of a submitted record.
    pub(crate) fn owner_key(&self, def: &RelationDef, value: &Value) -> Value {
        match value {
            Value::Object(record) => record
                .get(&self.key_name(&def.related))
                .cloned()
                .unwrap_or(Value::Null),
            other => other.clone(),
        }
    }

    /// Points the foreign key of `parent` at the submitted owner.
    fn associate(&mut self, def: &RelationDef, parent: &Value, value: &Value) -> StoreResult<()> {
        let owner = self.owner_key(def, value);
        let fk = def.foreign_key();
        let record = self
            .table_mut(&def.entity)?
            .find_mut(parent)
            .ok_or_else(|| {
                StoreError::NotFound(format!("{} {}", def.entity, key_string(parent)))
            })?;
        debug!("Associating {}.{} with {}", def.entity, def.name, key_string(&owner));
        record.insert(fk, owner);
        Ok(())
    }

    /// Updates the related record of a has-one relation, creating it when
    /// none exists yet.
    fn save_has_one(
        &mut self,
        def: &RelationDef,
        parent: &Value,
        value: &Value,
    ) -> StoreResult<()> {
        let Value::Object(attributes) = value else {
            return Ok(());
        };
        let fk = def.foreign_key();
        let existing = self.tables.get_mut(&def.related).and_then(|t| {
            t.records
                .iter_mut()
                .find(|r| r.get(&fk).is_some_and(|v| keys_match(v, parent)))
        });

        match existing {
            Some(record) => {
                record.extend(attributes.clone());
            }
            None => {
                let mut attributes = attributes.clone();
                attributes.insert(fk, parent.clone());
                self.insert(&def.related, attributes)?;
            }
        }
        Ok(())
    }

    /// Points exactly the submitted records of a has-many relation at `parent`.
    fn sync_has_many(
        &mut self,
        def: &RelationDef,
        parent: &Value,
        value: &Value,
    ) -> StoreResult<()> {
        let keys: Vec<Value> = match value {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        };
        let fk = def.foreign_key();
        let table = self.table_mut(&def.related)?;
        let key_name = table.key_name.clone();

        for record in &mut table.records {
            let selected = record
                .get(&key_name)
                .is_some_and(|k| keys.iter().any(|wanted| keys_match(k, wanted)));
            let attached = record.get(&fk).is_some_and(|v| keys_match(v, parent));
            if selected {
                record.insert(fk.clone(), parent.clone());
            } else if attached {
                record.insert(fk.clone(), Value::Null);
            }
        }
        Ok(())
    }
}

/// Reads submitted many-to-many input: a list of keys, or a list (or JSON
/// string) of records carrying the related key under `selector` and pivot
/// attributes under every other key.
fn pivot_rows_from_input(
    selector: &str,
    value: &Value,
) -> StoreResult<Vec<(Value, Map<String, Value>)>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::String(s) if s.is_empty() => return Ok(Vec::new()),
        Value::String(s) => match serde_json::from_str::<Value>(s)? {
            Value::Array(items) => items,
            other => vec![other],
        },
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(mut record) => {
                let related = record.remove(selector).unwrap_or(Value::Null);
                if related.is_null() {
                    continue;
                }
                rows.push((related, record));
            }
            Value::Null => {}
            key => rows.push((key, Map::new())),
        }
    }
    Ok(rows)
}

/// Shared, lockable handle to a [`Graph`].
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedGraph(Arc<Mutex<Graph>>);

impl SharedGraph {
    /// Lock for reads that cannot fail. A poisoned graph is still readable.
    pub(crate) fn read(&self) -> MutexGuard<'_, Graph> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> StoreResult<MutexGuard<'_, Graph>> {
        self.0
            .lock()
            .map_err(|e| StoreError::Backend(format!("graph lock poisoned: {e}")))
    }
}

/// In-memory store for one entity type over a shared entity graph.
///
/// Implements every collaborator the edit engine needs: entity loading and
/// saving, relation persistence and relation metadata. Handles created with
/// [`scoped`](Self::scoped) share the same graph.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    graph: SharedGraph,
    entity_type: String,
}

impl MemoryStore {
    /// Creates an empty graph, scoped to `entity_type`.
    pub fn new(entity_type: &str) -> Self {
        Self {
            graph: SharedGraph::default(),
            entity_type: entity_type.to_string(),
        }
    }

    /// Builds a graph from `fixture`, scoped to `entity_type`.
    pub fn from_fixture(fixture: Fixture, entity_type: &str) -> StoreResult<Self> {
        let store = Self::new(entity_type);
        for (name, table) in fixture.entities {
            store.define_table(&name, &table.key_name)?;
            for record in table.records {
                store.insert(&name, record)?;
            }
        }
        for def in fixture.relations {
            store.define_relation(def)?;
        }
        for pivot in fixture.pivots {
            store.attach(
                &pivot.entity,
                &pivot.relation,
                pivot.parent,
                pivot.related,
                pivot.attributes,
            )?;
        }
        info!("Loaded fixture graph (scope={})", entity_type);
        Ok(store)
    }

    /// A handle on the same graph, scoped to another entity type.
    pub fn scoped(&self, entity_type: &str) -> Self {
        Self {
            graph: self.graph.clone(),
            entity_type: entity_type.to_string(),
        }
    }

    /// Entity type this handle loads.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Declares a table with key attribute `key_name`. Existing records are kept.
    pub fn define_table(&self, entity_type: &str, key_name: &str) -> StoreResult<()> {
        let mut graph = self.graph.write()?;
        graph
            .tables
            .entry(entity_type.to_string())
            .or_insert_with(|| Table::new(key_name))
            .key_name = key_name.to_string();
        Ok(())
    }

    /// Declares a relation accessor, replacing any of the same name.
    pub fn define_relation(&self, def: RelationDef) -> StoreResult<()> {
        let mut graph = self.graph.write()?;
        graph
            .relations
            .retain(|r| !(r.entity == def.entity && r.name == def.name));
        graph.relations.push(def);
        Ok(())
    }

    /// Inserts a record, generating a UUID v7 key when none is given.
    /// Returns the record's key.
    pub fn insert(&self, entity_type: &str, attributes: Map<String, Value>) -> StoreResult<Value> {
        self.graph.write()?.insert(entity_type, attributes)
    }

    /// Adds a join row to the many-to-many relation `relation` of `entity_type`.
    pub fn attach(
        &self,
        entity_type: &str,
        relation: &str,
        parent: Value,
        related: Value,
        attributes: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut graph = self.graph.write()?;
        match graph.relation(entity_type, relation) {
            Some(def) if def.kind == RelationKind::BelongsToMany => {}
            _ => {
                return Err(StoreError::InvalidData(format!(
                    "{entity_type}.{relation} is not a many-to-many relation"
                )));
            }
        }
        graph.pivots.push(PivotRow {
            entity: entity_type.to_string(),
            relation: relation.to_string(),
            parent,
            related,
            attributes,
        });
        Ok(())
    }

    /// Loads a record of any type, or `None` if absent.
    pub fn get(&self, entity_type: &str, key: &Value) -> Option<StoredEntity> {
        let graph = self.graph.read();
        let table = graph.tables.get(entity_type)?;
        let record = table.find(key)?;
        Some(StoredEntity::new(
            self.graph.clone(),
            entity_type,
            &table.key_name,
            record.clone(),
        ))
    }

    /// Number of records of `entity_type`.
    pub fn count(&self, entity_type: &str) -> usize {
        self.graph
            .read()
            .tables
            .get(entity_type)
            .map_or(0, |t| t.records.len())
    }
}

impl EntityStore<StoredEntity> for MemoryStore {
    fn find_or_fail(&self, id: &Value) -> StoreResult<StoredEntity> {
        self.get(&self.entity_type, id).ok_or_else(|| {
            StoreError::NotFound(format!("{} {}", self.entity_type, key_string(id)))
        })
    }

    fn persist(
        &self,
        entity: &mut StoredEntity,
        attributes: &Map<String, Value>,
    ) -> StoreResult<bool> {
        let key = entity.key();
        let mut filled = entity.clone();
        filled.fill(attributes);

        let mut graph = self.graph.write()?;
        let entity_type = entity.entity_type().to_string();
        let record = graph
            .table_mut(&entity_type)?
            .find_mut(&key)
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity_type, key_string(&key))))?;

        let modified = record != filled.attributes();
        *record = filled.attributes().clone();
        debug!("Persisted {} {} (modified={})", entity_type, key_string(&key), modified);
        *entity = filled;
        Ok(modified)
    }
}

impl RelationMetadata<StoredEntity> for MemoryStore {
    fn is_to_one(&self, entity: &StoredEntity, accessor: &str) -> bool {
        self.graph
            .read()
            .relation(entity.entity_type(), accessor)
            .is_some_and(|def| def.kind.is_to_one())
    }
}

impl RelationPersister<StoredEntity> for MemoryStore {
    fn apply(&self, entity: &StoredEntity, data: &Map<String, Value>) -> StoreResult<()> {
        let parent = entity.key();
        let mut graph = self.graph.write()?;

        for (name, value) in data {
            let Some(def) = graph.relation(entity.entity_type(), name).cloned() else {
                continue;
            };
            match def.kind {
                RelationKind::BelongsToMany => graph.sync_pivots(&def, &parent, value)?,
                RelationKind::HasOne => graph.save_has_one(&def, &parent, value)?,
                RelationKind::HasMany => graph.sync_has_many(&def, &parent, value)?,
                RelationKind::BelongsTo => graph.associate(&def, &parent, value)?,
            }
        }
        Ok(())
    }
}
