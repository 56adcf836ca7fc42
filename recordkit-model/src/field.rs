use crate::Entity;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// The name of a form field: one attribute, or several attributes edited
/// together (e.g., a date range bound to `start` and `end`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldName {
    Single(String),
    Composite(Vec<String>),
}

impl FieldName {
    /// Key under which the field is registered: the name itself, or the
    /// composite names joined by `,`.
    pub fn key(&self) -> String {
        match self {
            Self::Single(name) => name.clone(),
            Self::Composite(names) => names.join(","),
        }
    }

    /// All attribute names this field is bound to.
    pub fn names(&self) -> &[String] {
        match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::Composite(names) => names,
        }
    }

    /// The single name, if this is not a composite field.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name),
            Self::Composite(_) => None,
        }
    }

    /// Dotted form of the name, converting HTML bracket notation
    /// (`address[street]` becomes `address.street`).
    pub fn relation_path(&self) -> String {
        let raw = self.names().last().map(String::as_str).unwrap_or_default();
        raw.replace("][", ".").replace('[', ".").replace(']', "")
    }

    /// Last segment of [`relation_path`](Self::relation_path).
    pub fn terminal(&self) -> String {
        let path = self.relation_path();
        path.rsplit('.').next().unwrap_or_default().to_string()
    }

    /// Reads the field's value straight off the entity's attributes.
    ///
    /// Composite names are probed in order and only the last read is kept.
    pub fn read<E: Entity>(&self, entity: &E) -> Value {
        match self {
            Self::Single(name) => entity.attribute(name),
            Self::Composite(names) => {
                let mut result = Value::Array(Vec::new());
                for name in names {
                    result = entity.attribute(name);
                }
                result
            }
        }
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<&str>> for FieldName {
    fn from(names: Vec<&str>) -> Self {
        Self::Composite(names.into_iter().map(String::from).collect())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Describes one editable field of an edit form.
///
/// Keys the engine does not interpret (`wrapper`, `hint`, ...) are kept in
/// `extra` and survive a serialize round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: FieldName,
    /// Widget type (e.g., "text", "hidden", "repeatable").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Dotted relation path the value lives behind (e.g., "author.profile").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfields: Option<Vec<FieldDescriptor>>,
    /// Many-to-many relation carrying join-table attributes.
    #[serde(default, skip_serializing_if = "is_false")]
    pub pivot: bool,
    /// Sub-form of a repeatable field. The entry named like this field is the
    /// relation selector, every other entry is a pivot attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescriptor>>,
    /// Virtual field packed into a JSON column instead of its own attribute.
    #[serde(default, skip_serializing_if = "is_false")]
    pub fake: bool,
    /// Column a fake field is packed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_in: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDescriptor {
    /// A bare field with no widget type.
    pub fn new(name: impl Into<FieldName>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            label: None,
            entity: None,
            value: None,
            subfields: None,
            pivot: false,
            fields: None,
            fake: false,
            store_in: None,
            extra: Map::new(),
        }
    }

    fn typed(name: impl Into<FieldName>, field_type: &str) -> Self {
        Self {
            field_type: Some(field_type.to_string()),
            ..Self::new(name)
        }
    }

    /// Shorthand for a text input.
    pub fn text(name: &str) -> Self {
        Self::typed(name, "text")
    }

    /// Shorthand for a hidden input carrying `value`.
    pub fn hidden(name: &str, value: Value) -> Self {
        Self::typed(name, "hidden").with_value(value)
    }

    /// Shorthand for a field whose value sits behind the relation path `entity`.
    pub fn relation(name: &str, entity: &str) -> Self {
        Self {
            entity: Some(entity.to_string()),
            ..Self::typed(name, "relationship")
        }
    }

    /// Shorthand for a repeatable sub-form over a many-to-many relation with
    /// pivot attributes. The relation selector is prepended to `pivot_fields`.
    pub fn pivot_repeatable(name: &str, entity: &str, pivot_fields: Vec<FieldDescriptor>) -> Self {
        let mut fields = Vec::with_capacity(pivot_fields.len() + 1);
        fields.push(Self::typed(name, "select"));
        fields.extend(pivot_fields);
        Self {
            entity: Some(entity.to_string()),
            pivot: true,
            fields: Some(fields),
            ..Self::typed(name, "repeatable")
        }
    }

    /// Shorthand for a field grouping several plain attributes.
    pub fn with_subfields(name: &str, subfields: Vec<FieldDescriptor>) -> Self {
        Self {
            subfields: Some(subfields),
            ..Self::typed(name, "group")
        }
    }

    /// Shorthand for a virtual field packed into `column`.
    pub fn fake(name: &str, column: Option<&str>) -> Self {
        Self {
            fake: true,
            store_in: column.map(String::from),
            ..Self::text(name)
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Key this field is registered under in a [`FieldMap`].
    pub fn key(&self) -> String {
        self.name.key()
    }

    /// True for a repeatable many-to-many field with a non-empty sub-form.
    pub fn has_pivot_fields(&self) -> bool {
        self.pivot && self.fields.as_ref().is_some_and(|f| !f.is_empty())
    }
}

/// Fields keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldDescriptor)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `field` under `key`. An existing entry keeps its position and
    /// is replaced.
    pub fn insert(&mut self, key: impl Into<String>, field: FieldDescriptor) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = field,
            None => self.entries.push((key, field)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldDescriptor> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.entries.iter().map(|(_, f)| f)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut FieldDescriptor> {
        self.entries.iter_mut().map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.entries.iter().map(|(k, f)| (k.as_str(), f))
    }
}

impl From<Vec<FieldDescriptor>> for FieldMap {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        let mut map = Self::new();
        for field in fields {
            map.insert(field.key(), field);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, FieldDescriptor);
    type IntoIter = std::vec::IntoIter<(String, FieldDescriptor)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, field) in &self.entries {
            map.serialize_entry(key, field)?;
        }
        map.end()
    }
}
