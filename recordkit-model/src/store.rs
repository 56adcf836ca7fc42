use crate::{Entity, FieldDescriptor, StoreResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Loads and saves entities by key.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Loads the entity with key `id`.
    /// Fails with `StoreError::NotFound` when no such record exists.
    fn find_or_fail(&self, id: &Value) -> StoreResult<E>;

    /// Merges `attributes` into `entity` and writes it back.
    /// Returns true if the store was modified.
    fn persist(&self, entity: &mut E, attributes: &Map<String, Value>) -> StoreResult<bool>;
}

/// Writes every relation named in submitted data: to-one foreign keys,
/// to-many attach/detach and many-to-many sync with pivot attributes.
pub trait RelationPersister<E: Entity>: Send + Sync {
    fn apply(&self, entity: &E, data: &Map<String, Value>) -> StoreResult<()>;
}

/// Answers questions about an entity's relation accessors.
pub trait RelationMetadata<E: Entity>: Send + Sync {
    /// True when `accessor` exists on `entity` and yields a single record.
    fn is_to_one(&self, entity: &E, accessor: &str) -> bool;
}

/// Supplies the field list of the edit form for the current entity type.
pub trait FieldDescriptorSource: Send + Sync {
    fn fields(&self) -> Vec<FieldDescriptor>;
}

impl FieldDescriptorSource for Vec<FieldDescriptor> {
    fn fields(&self) -> Vec<FieldDescriptor> {
        self.clone()
    }
}

impl<T: FieldDescriptorSource + ?Sized> FieldDescriptorSource for Arc<T> {
    fn fields(&self) -> Vec<FieldDescriptor> {
        (**self).fields()
    }
}

/// Request-scoped context: which entry the caller is looking at when no
/// explicit key is given.
///
/// The default implementation knows no current entry.
pub trait RequestContext: Send + Sync {
    fn current_entry_id(&self) -> Option<Value> {
        None
    }
}

/// Context pinned to a fixed entry key (route parameter already parsed).
#[derive(Debug, Clone, PartialEq)]
pub struct FixedEntry(pub Value);

impl RequestContext for FixedEntry {
    fn current_entry_id(&self) -> Option<Value> {
        Some(self.0.clone())
    }
}
