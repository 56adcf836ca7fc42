//! Input normalization applied before an update is merged.
//!
//! Two passes, run in this order by [`CrudPanel::update`](crate::CrudPanel::update):
//! 1. JSON-cast attributes submitted as encoded strings are decoded.
//! 2. Fake fields are moved into the column they are stored in.

use crate::config::CrudConfig;
use crate::error::CrudResult;
use recordkit_model::FieldDescriptor;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Decodes submitted string values of JSON-cast attributes into native JSON.
///
/// Only fields with a single name listed in `config.json_columns` are
/// touched, and only when the submitted value is a non-empty string.
/// A string that does not parse becomes an empty array.
pub fn decode_json_casted_attributes(
    mut data: Map<String, Value>,
    fields: &[FieldDescriptor],
    config: &CrudConfig,
) -> Map<String, Value> {
    for field in fields {
        let Some(name) = field.name.as_single() else {
            continue;
        };
        if !config.is_json_column(name) {
            continue;
        }
        let Some(Value::String(raw)) = data.get(name) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        let decoded = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding undecodable JSON for '{}': {}", name, e);
                Value::Array(Vec::new())
            }
        };
        data.insert(name.to_string(), decoded);
    }
    data
}

/// Packs fake fields into their storage column.
///
/// Each submitted fake field is removed from `data` and inserted into the
/// object held by its column (`store_in`, else `config.fake_column`).
/// Columns that do not hold native JSON are re-encoded as a JSON string.
pub fn compact_fake_fields(
    mut data: Map<String, Value>,
    fields: &[FieldDescriptor],
    config: &CrudConfig,
) -> CrudResult<Map<String, Value>> {
    let mut columns: Vec<String> = Vec::new();

    for field in fields.iter().filter(|f| f.fake) {
        let Some(name) = field.name.as_single() else {
            continue;
        };
        let Some(value) = data.remove(name) else {
            continue;
        };

        let column = field
            .store_in
            .clone()
            .unwrap_or_else(|| config.fake_column.clone());
        let mut packed: Map<String, Value> = match data.remove(&column) {
            Some(Value::Object(existing)) => existing,
            Some(Value::String(encoded)) if !encoded.is_empty() => {
                match serde_json::from_str::<Value>(&encoded) {
                    Ok(Value::Object(existing)) => existing,
                    _ => {
                        warn!("Discarding non-object value of '{}': {}", column, encoded);
                        Map::new()
                    }
                }
            }
            None | Some(Value::Null) | Some(Value::String(_)) => Map::new(),
            Some(other) => {
                warn!("Discarding non-object value of '{}': {}", column, other);
                Map::new()
            }
        };
        packed.insert(name.to_string(), value);
        data.insert(column.clone(), Value::Object(packed));

        debug!("Packed fake field '{}' into '{}'", name, column);
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    for column in columns {
        if config.is_json_column(&column) {
            continue;
        }
        let packed = data
            .remove(&column)
            .unwrap_or_else(|| Value::Object(Map::new()));
        data.insert(column, Value::String(serde_json::to_string(&packed)?));
    }

    Ok(data)
}
