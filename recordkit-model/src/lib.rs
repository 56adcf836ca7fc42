//! Core model types for recordkit.
//!
//! Defines the contract between the edit engine and whatever stores the data:
//! - [`Entity`]: runtime attribute and relation access over a record
//! - [`Related`]: what a relation accessor yields (one, none, or many)
//! - [`FieldDescriptor`] / [`FieldName`] / [`FieldMap`]: the edit form's field list
//! - [`EntityStore`], [`RelationPersister`], [`RelationMetadata`],
//!   [`FieldDescriptorSource`], [`RequestContext`]: collaborator traits
//!
//! These types are consumed by the engine (`recordkit-crud`), the in-memory
//! store (`recordkit-storage`) and the CLI.

mod entity;
mod error;
mod field;
mod store;

pub use entity::{Entity, Related};
pub use error::{StoreError, StoreResult};
pub use field::{FieldDescriptor, FieldMap, FieldName};
pub use store::{
    EntityStore, FieldDescriptorSource, FixedEntry, RelationMetadata, RelationPersister,
    RequestContext,
};
