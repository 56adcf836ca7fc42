//! Relation path resolver - reads a field's value across relation hops.
//!
//! A field with `entity = "author.profile"` lives behind the `author` hop,
//! on the `profile` accessor of whatever `author` yields. Hops that are
//! missing or empty are skipped rather than reported: an edit form for a
//! partially populated graph still renders, with whatever value is reachable.

use crate::error::CrudResult;
use crate::pivot::PivotDataAssembler;
use recordkit_model::{Entity, FieldDescriptor, Related, RelationMetadata};
use serde_json::Value;
use tracing::debug;

/// Resolves dotted relation paths against a loaded entity.
pub struct RelationPathResolver<'a, E: Entity> {
    metadata: &'a dyn RelationMetadata<E>,
}

impl<'a, E: Entity> RelationPathResolver<'a, E> {
    /// Creates a resolver classifying relations through `metadata`.
    pub fn new(metadata: &'a dyn RelationMetadata<E>) -> Self {
        Self { metadata }
    }

    /// Resolves the current value of `field` on `entity`.
    ///
    /// Without an `entity` path this is a plain attribute read. Otherwise:
    /// - a to-one final accessor yields the field's terminal attribute read
    ///   off the related entity;
    /// - a repeatable pivot field yields its JSON-encoded pivot records;
    /// - anything else yields the accessor's own result, or the attribute of
    ///   that name when no such accessor exists.
    pub fn resolve(&self, entity: &E, field: &FieldDescriptor) -> CrudResult<Value> {
        let Some(path) = field.entity.as_deref() else {
            return Ok(field.name.read(entity));
        };

        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, hops)) = segments.split_last() else {
            return Ok(field.name.read(entity));
        };
        let target = self.walk(entity, hops);

        if self.metadata.is_to_one(&target, last) {
            let attribute = field.name.terminal();
            debug!("Resolving '{}' through to-one '{}'", attribute, path);
            return Ok(match target.relation(last) {
                Some(Related::One(related)) => related.attribute(&attribute),
                _ => Value::Null,
            });
        }

        if field.has_pivot_fields() {
            let related = target
                .relation(last)
                .map(Related::into_vec)
                .unwrap_or_default();
            return Ok(Value::String(PivotDataAssembler::assemble(&related, field)?));
        }

        Ok(match target.relation(last) {
            Some(Related::One(related)) => related.to_value(),
            Some(Related::OneEmpty) => Value::Null,
            Some(Related::Many(items)) => Value::Array(items.iter().map(E::to_value).collect()),
            None => target.attribute(last),
        })
    }

    /// Follows `hops` from `entity`. A hop only advances when its accessor
    /// exists and yields a related entity; otherwise the walk stays put.
    fn walk(&self, entity: &E, hops: &[&str]) -> E {
        let mut current = entity.clone();
        for hop in hops {
            match current.relation(hop) {
                Some(Related::One(next)) => current = next,
                _ => debug!("Relation hop '{}' unresolved, staying on current entity", hop),
            }
        }
        current
    }
}
