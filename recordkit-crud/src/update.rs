//! Update coordinator.
//!
//! Relations are written first, through the relation persister, with the
//! full normalized input. Only then is the remaining input merged into the
//! entity's own attributes, minus the many-to-many fields the persister
//! already synced.

use crate::error::CrudResult;
use crate::fake::{compact_fake_fields, decode_json_casted_attributes};
use crate::panel::CrudPanel;
use recordkit_model::Entity;
use serde_json::{Map, Value};
use tracing::{debug, info};

impl<E: Entity> CrudPanel<E> {
    /// Updates the entry with key `id` from submitted form `data`.
    ///
    /// Fails with `CrudError::EntityNotFound` before any write when `id`
    /// does not resolve. Relation changes made by the persister are not
    /// guaranteed to be visible on the returned entity; reload to observe them.
    pub fn update(&self, id: &Value, data: Map<String, Value>) -> CrudResult<E> {
        let fields = self.fields();
        let data = decode_json_casted_attributes(data, &fields, &self.config);
        let mut data = compact_fake_fields(data, &fields, &self.config)?;

        let mut entry = self.get_entry(id)?;
        debug!("Updating {} {}", entry.entity_type(), id);

        self.relations.apply(&entry, &data)?;

        // n-n relations were synced by the persister
        for field in self.relation_fields_with_pivot() {
            for name in field.name.names() {
                if data.remove(name).is_some() {
                    debug!("Excluding many-to-many field '{}' from direct merge", name);
                }
            }
        }

        let modified = self.store.persist(&mut entry, &data)?;
        info!(
            "Updated {} {} ({} attributes, modified={})",
            entry.entity_type(),
            id,
            data.len(),
            modified
        );
        Ok(entry)
    }
}
