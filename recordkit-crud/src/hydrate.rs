//! Field value hydrator - fills in the edit form for an existing entry.

use crate::error::CrudResult;
use crate::panel::CrudPanel;
use recordkit_model::{Entity, FieldDescriptor, FieldMap};
use serde_json::Value;
use tracing::debug;

/// Key of the hidden field carrying the entry's key.
pub const ID_FIELD: &str = "id";

impl<E: Entity> CrudPanel<E> {
    /// All fields of the edit form for entry `id` (or the request context's
    /// current entry when `id` is `None`), each with its current value.
    ///
    /// Fields that already carry a value are left alone. The result always
    /// contains an `id` field; if none was declared a hidden one holding the
    /// entry key is appended.
    pub fn get_update_fields(&self, id: Option<&Value>) -> CrudResult<FieldMap> {
        let entry = match id {
            Some(id) => self.get_entry(id)?,
            None => self.get_current_entry()?,
        };
        let resolver = self.resolver();

        let mut fields = FieldMap::from(self.fields());
        for field in fields.values_mut() {
            if field.value.is_some() {
                continue;
            }
            let value = match &field.subfields {
                Some(subfields) => {
                    Value::Array(subfields.iter().map(|sub| sub.name.read(&entry)).collect())
                }
                None => resolver.resolve(&entry, field)?,
            };
            field.value = Some(value);
        }

        if !fields.contains_key(ID_FIELD) {
            debug!("Adding hidden key field for {} {}", entry.entity_type(), entry.key());
            fields.insert(ID_FIELD, FieldDescriptor::hidden(entry.key_name(), entry.key()));
        }

        Ok(fields)
    }
}
