//! In-memory storage layer for recordkit.
//!
//! Provides a reference implementation of the collaborators the edit engine
//! depends on, backed by a shared in-memory entity graph.
//!
//! # Architecture
//!
//! - Records are JSON attribute maps in per-type tables, keyed by a key attribute
//! - Relations (`has_one`, `belongs_to`, `has_many`, `belongs_to_many`) are
//!   declared per entity type and resolved lazily on access
//! - Many-to-many links are join rows carrying pivot attributes
//! - Graphs can be built in code or loaded from a JSON [`Fixture`]

mod entity;
mod fixture;
mod memory;
mod relation;

pub use entity::StoredEntity;
pub use fixture::{Fixture, PivotFixture, TableFixture};
pub use memory::{MemoryStore, DEFAULT_KEY_NAME};
pub use relation::{RelationDef, RelationKind};
