//! Edit engine for recordkit.
//!
//! Two operations back a generic record-editing screen:
//!
//! - [`CrudPanel::update`] merges submitted form data into a stored entity.
//!   Input is normalized (JSON-cast attributes decoded, fake fields packed),
//!   relations are handed to the [`RelationPersister`](recordkit_model::RelationPersister),
//!   and the rest is merged into the entity's attributes. Many-to-many fields
//!   are kept out of that merge because the persister already synced them.
//! - [`CrudPanel::get_update_fields`] rebuilds the edit form: every declared
//!   field gets its current value, read directly, through a relation path
//!   ([`RelationPathResolver`]), or as JSON pivot records for repeatable
//!   many-to-many fields ([`PivotDataAssembler`]).
//!
//! # Example
//!
//! ```ignore
//! let panel = CrudPanel::new(store.clone(), store.clone(), store.clone(), Arc::new(fields))
//!     .with_config(CrudConfig::default());
//!
//! let form = panel.get_update_fields(Some(&json!(1)))?;
//! let article = panel.update(&json!(1), data)?;
//! ```

mod config;
mod error;
mod fake;
mod hydrate;
mod panel;
mod pivot;
mod resolver;
mod update;

pub use config::{CrudConfig, DEFAULT_FAKE_COLUMN};
pub use error::{CrudError, CrudResult};
pub use fake::{compact_fake_fields, decode_json_casted_attributes};
pub use hydrate::ID_FIELD;
pub use panel::CrudPanel;
pub use pivot::PivotDataAssembler;
pub use resolver::RelationPathResolver;
