use crate::config::CrudConfig;
use crate::error::{CrudError, CrudResult};
use crate::resolver::RelationPathResolver;
use recordkit_model::{
    Entity, EntityStore, FieldDescriptor, FieldDescriptorSource, RelationMetadata,
    RelationPersister, RequestContext,
};
use serde_json::Value;
use std::sync::Arc;

/// The edit panel for one entity type: wires the collaborators that
/// [`update`](Self::update) and [`get_update_fields`](Self::get_update_fields) need.
pub struct CrudPanel<E: Entity> {
    pub(crate) store: Arc<dyn EntityStore<E>>,
    pub(crate) relations: Arc<dyn RelationPersister<E>>,
    pub(crate) metadata: Arc<dyn RelationMetadata<E>>,
    pub(crate) fields: Arc<dyn FieldDescriptorSource>,
    pub(crate) context: Option<Arc<dyn RequestContext>>,
    pub(crate) config: CrudConfig,
}

impl<E: Entity> CrudPanel<E> {
    /// Creates a panel with the default configuration and no request context.
    pub fn new(
        store: Arc<dyn EntityStore<E>>,
        relations: Arc<dyn RelationPersister<E>>,
        metadata: Arc<dyn RelationMetadata<E>>,
        fields: Arc<dyn FieldDescriptorSource>,
    ) -> Self {
        Self {
            store,
            relations,
            metadata,
            fields,
            context: None,
            config: CrudConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the request context used when no explicit key is given.
    pub fn with_request_context(mut self, context: Arc<dyn RequestContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// Current field list.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        self.fields.fields()
    }

    /// Relation fields that sync a many-to-many relation with pivot attributes.
    pub fn relation_fields_with_pivot(&self) -> Vec<FieldDescriptor> {
        self.fields()
            .into_iter()
            .filter(|f| f.entity.is_some() && f.pivot)
            .collect()
    }

    /// Returns a resolver bound to this panel's relation metadata.
    pub fn resolver(&self) -> RelationPathResolver<'_, E> {
        RelationPathResolver::new(self.metadata.as_ref())
    }

    /// Loads the entry with key `id`.
    pub fn get_entry(&self, id: &Value) -> CrudResult<E> {
        Ok(self.store.find_or_fail(id)?)
    }

    /// Loads the entry the request context points at.
    pub fn get_current_entry(&self) -> CrudResult<E> {
        let id = self
            .context
            .as_ref()
            .and_then(|ctx| ctx.current_entry_id())
            .ok_or(CrudError::NoCurrentEntry)?;
        self.get_entry(&id)
    }
}
