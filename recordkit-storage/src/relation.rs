use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a relation links two entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The related record carries a foreign key to the owner.
    HasOne,
    /// The owner carries a foreign key to the related record.
    BelongsTo,
    /// Many related records carry a foreign key to the owner.
    HasMany,
    /// Join rows link owner and related records, with pivot attributes.
    BelongsToMany,
}

impl RelationKind {
    /// True for relations yielding a single record.
    pub fn is_to_one(self) -> bool {
        matches!(self, Self::HasOne | Self::BelongsTo)
    }
}

/// A relation accessor declared on an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Owning entity type.
    pub entity: String,
    /// Accessor name.
    pub name: String,
    pub kind: RelationKind,
    /// Related entity type.
    pub related: String,
    /// Foreign key attribute. Defaults to `<entity>_id` for `HasOne`/`HasMany`
    /// and `<name>_id` for `BelongsTo`; unused by `BelongsToMany`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

impl RelationDef {
    pub fn new(entity: &str, name: &str, kind: RelationKind, related: &str) -> Self {
        Self {
            entity: entity.to_string(),
            name: name.to_string(),
            kind,
            related: related.to_string(),
            foreign_key: None,
        }
    }

    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = Some(foreign_key.to_string());
        self
    }

    /// Effective foreign key attribute.
    pub fn foreign_key(&self) -> String {
        if let Some(fk) = &self.foreign_key {
            return fk.clone();
        }
        match self.kind {
            RelationKind::BelongsTo => format!("{}_id", self.name),
            _ => format!("{}_id", self.entity),
        }
    }
}

/// Compares record keys loosely: `1` and `"1"` name the same record, since
/// keys arrive from form submissions as strings.
pub(crate) fn keys_match(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    a == b || key_string(a) == key_string(b)
}

pub(crate) fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
