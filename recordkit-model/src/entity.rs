use serde_json::{Map, Value};

/// Result of invoking a relation accessor on an [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub enum Related<E> {
    /// A to-one accessor with a related entity attached.
    One(E),
    /// A to-one accessor with nothing attached.
    OneEmpty,
    /// A to-many accessor, in relation order. May be empty.
    Many(Vec<E>),
}

impl<E> Related<E> {
    /// True when the accessor yielded nothing usable.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::OneEmpty => true,
            Self::Many(items) => items.is_empty(),
        }
    }

    /// Flattens the result into an ordered collection.
    pub fn into_vec(self) -> Vec<E> {
        match self {
            Self::One(entity) => vec![entity],
            Self::OneEmpty => Vec::new(),
            Self::Many(items) => items,
        }
    }
}

/// Runtime attribute and relation access over a persisted record.
///
/// Everything the update and hydration paths know about a record goes
/// through this trait, so concrete storage types stay behind it. Reads
/// never fail: absent attributes and pivot values come back as
/// `Value::Null`.
pub trait Entity: Clone {
    /// Type name of the record (e.g., "article").
    fn entity_type(&self) -> &str;

    /// Name of the key attribute (usually "id").
    fn key_name(&self) -> &str;

    /// Key value of this record.
    fn key(&self) -> Value {
        self.attribute(self.key_name())
    }

    /// Reads a plain attribute by name.
    fn attribute(&self, name: &str) -> Value;

    /// Invokes the relation accessor `name`.
    /// Returns `None` when no accessor of that name exists.
    fn relation(&self, name: &str) -> Option<Related<Self>>;

    /// Reads an attribute stored on the join row this record was reached
    /// through. Only meaningful for records loaded via a many-to-many relation.
    fn pivot(&self, name: &str) -> Value {
        let _ = name;
        Value::Null
    }

    /// Merges attributes into this record in memory.
    fn fill(&mut self, attributes: &Map<String, Value>);

    /// Attribute snapshot, used when a relation itself is the resolved value.
    fn to_value(&self) -> Value;
}
