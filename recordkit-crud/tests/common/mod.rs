//! Shared test helpers for engine tests.

#![allow(dead_code)]

use recordkit_crud::CrudPanel;
use recordkit_model::{
    EntityStore, FieldDescriptor, RelationMetadata, RelationPersister, StoreError, StoreResult,
};
use recordkit_storage::{MemoryStore, RelationDef, RelationKind, StoredEntity};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Articles with an author (who has a profile and a company), comments and
/// tags with pivot attributes. Article 2 has no relations at all.
pub fn blog_store() -> MemoryStore {
    let store = MemoryStore::new("article");
    let records = [
        ("company", json!({"id": 5, "name": "Acme", "founded": 1999})),
        ("author", json!({"id": 10, "name": "Ada", "company_id": 5})),
        ("profile", json!({"id": 100, "author_id": 10, "bio": "Engineer"})),
        ("article", json!({"id": 1, "title": "Hello", "body": "First post", "author_id": 10})),
        ("article", json!({"id": 2, "title": "Orphan", "body": ""})),
        ("tag", json!({"id": 7, "label": "rust"})),
        ("tag", json!({"id": 8, "label": "db"})),
        ("comment", json!({"id": 50, "article_id": 1, "text": "first"})),
        ("comment", json!({"id": 51, "article_id": 1, "text": "second"})),
    ];
    for (entity_type, record) in records {
        store.insert(entity_type, obj(record)).unwrap();
    }

    let relations = [
        RelationDef::new("article", "author", RelationKind::BelongsTo, "author"),
        RelationDef::new("author", "profile", RelationKind::HasOne, "profile"),
        RelationDef::new("author", "company", RelationKind::BelongsTo, "company"),
        RelationDef::new("article", "comments", RelationKind::HasMany, "comment"),
        RelationDef::new("article", "tags", RelationKind::BelongsToMany, "tag"),
    ];
    for def in relations {
        store.define_relation(def).unwrap();
    }

    store
        .attach("article", "tags", json!(1), json!(8), obj(json!({"weight": 2, "note": "x"})))
        .unwrap();
    store
        .attach("article", "tags", json!(1), json!(7), obj(json!({"weight": 5, "note": "y"})))
        .unwrap();
    store
}

pub fn tags_field() -> FieldDescriptor {
    FieldDescriptor::pivot_repeatable(
        "tags",
        "tags",
        vec![FieldDescriptor::text("weight"), FieldDescriptor::text("note")],
    )
}

/// A panel wired straight to `store`.
pub fn panel(store: &MemoryStore, fields: Vec<FieldDescriptor>) -> CrudPanel<StoredEntity> {
    let shared = Arc::new(store.clone());
    CrudPanel::new(shared.clone(), shared.clone(), shared, Arc::new(fields))
}

/// Wraps a store and records every persistence call in order.
#[derive(Clone)]
pub struct Recording {
    pub inner: MemoryStore,
    pub calls: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    pub fail_relations: bool,
}

impl Recording {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_relations: false,
        }
    }

    pub fn failing(inner: MemoryStore) -> Self {
        Self {
            fail_relations: true,
            ..Self::new(inner)
        }
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn data_for(&self, call: &str) -> Option<Map<String, Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == call)
            .map(|(_, d)| d.clone())
    }

    pub fn panel(&self, fields: Vec<FieldDescriptor>) -> CrudPanel<StoredEntity> {
        let shared = Arc::new(self.clone());
        CrudPanel::new(shared.clone(), shared.clone(), shared, Arc::new(fields))
    }
}

impl EntityStore<StoredEntity> for Recording {
    fn find_or_fail(&self, id: &Value) -> StoreResult<StoredEntity> {
        self.inner.find_or_fail(id)
    }

    fn persist(&self, entity: &mut StoredEntity, attributes: &Map<String, Value>) -> StoreResult<bool> {
        self.calls.lock().unwrap().push(("persist".into(), attributes.clone()));
        self.inner.persist(entity, attributes)
    }
}

impl RelationPersister<StoredEntity> for Recording {
    fn apply(&self, entity: &StoredEntity, data: &Map<String, Value>) -> StoreResult<()> {
        self.calls.lock().unwrap().push(("apply".into(), data.clone()));
        if self.fail_relations {
            return Err(StoreError::Backend("relation write refused".into()));
        }
        self.inner.apply(entity, data)
    }
}

impl RelationMetadata<StoredEntity> for Recording {
    fn is_to_one(&self, entity: &StoredEntity, accessor: &str) -> bool {
        self.inner.is_to_one(entity, accessor)
    }
}
