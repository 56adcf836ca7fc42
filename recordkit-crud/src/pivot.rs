//! Pivot data assembler - builds the value of a repeatable many-to-many field.
//!
//! A repeatable field over a many-to-many relation shows one row per related
//! entity: the related key in the selector column, then every join-table
//! attribute the sub-form declares. The rows travel JSON-encoded, which is
//! the shape the repeatable widget submits back.

use crate::error::CrudResult;
use recordkit_model::{Entity, FieldDescriptor};
use serde_json::{Map, Value};
use tracing::debug;

/// Builds pivot records for repeatable many-to-many fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PivotDataAssembler;

impl PivotDataAssembler {
    /// Names of the pivot attributes declared by `field`'s sub-form.
    ///
    /// Every sub-field except the one named like `field` itself (the relation
    /// selector) is a pivot attribute, wherever it sits in the list.
    pub fn pivot_field_names(field: &FieldDescriptor) -> Vec<String> {
        let selector = field.key();
        field
            .fields
            .iter()
            .flatten()
            .map(FieldDescriptor::key)
            .filter(|name| *name != selector)
            .collect()
    }

    /// One record per related entity, in input order.
    pub fn records<E: Entity>(related: &[E], field: &FieldDescriptor) -> Vec<Value> {
        let selector = field.key();
        let pivot_fields = Self::pivot_field_names(field);

        related
            .iter()
            .map(|entity| {
                let mut record = Map::new();
                record.insert(selector.clone(), entity.key());
                for name in &pivot_fields {
                    record.insert(name.clone(), entity.pivot(name));
                }
                Value::Object(record)
            })
            .collect()
    }

    /// JSON-encoded array of [`records`](Self::records).
    pub fn assemble<E: Entity>(related: &[E], field: &FieldDescriptor) -> CrudResult<String> {
        let records = Self::records(related, field);
        debug!(
            "Assembled {} pivot records for field '{}'",
            records.len(),
            field.key()
        );
        Ok(serde_json::to_string(&records)?)
    }
}
