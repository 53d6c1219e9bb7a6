//! Response normalization
//!
//! The remote service wraps row collections either as a bare array or as an
//! object with a `rows` field, and each row either as `{id, data}` or as a
//! flat object. Everything here decodes the structure once into one canonical
//! shape and rejects anything else with [`DataAccessError::Schema`].

use rowbridge_domain::{DataAccessError, DocumentId, Fields, Result, Row, TableReference};
use serde_json::Value;

const ROWS_FIELD: &str = "rows";
const TABLES_FIELD: &str = "tables";
const ID_FIELD: &str = "id";
const DATA_FIELD: &str = "data";
const NAME_FIELD: &str = "name";

/// The two observed collection encodings
#[derive(Debug)]
enum Collection {
    /// `[...]`
    Bare(Vec<Value>),
    /// `{"<field>": [...], ...}`
    Envelope(Vec<Value>),
}

impl Collection {
    /// Inspect the payload structure; no other shape is a collection.
    fn decode(raw: Value, field: &str) -> Result<Self> {
        match raw {
            Value::Array(entries) => Ok(Self::Bare(entries)),
            Value::Object(mut object) => match object.remove(field) {
                Some(Value::Array(entries)) => Ok(Self::Envelope(entries)),
                Some(other) => Err(schema(format!(
                    "`{field}` must be an array, got {}",
                    type_name(&other)
                ))),
                None => Err(schema(format!("object payload has no `{field}` field"))),
            },
            other => Err(schema(format!(
                "expected an array or an object with `{field}`, got {}",
                type_name(&other)
            ))),
        }
    }

    fn into_entries(self) -> Vec<Value> {
        match self {
            Self::Bare(entries) | Self::Envelope(entries) => entries,
        }
    }
}

/// Normalize a row collection, preserving order
///
/// # Errors
/// `Schema` if the payload is not a recognized collection or any entry lacks
/// an identifier. A malformed payload never yields an empty result.
pub fn normalize_rows(raw: Value) -> Result<Vec<Row>> {
    Collection::decode(raw, ROWS_FIELD)?
        .into_entries()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| decode_row(entry).map_err(|err| at_index(index, err)))
        .collect()
}

/// Normalize a single-row echo
///
/// Accepts a row object, or a collection in either encoding holding exactly
/// one row.
///
/// # Errors
/// `Schema` for any other shape.
pub fn normalize_row(raw: Value) -> Result<Row> {
    let is_collection = match &raw {
        Value::Array(_) => true,
        Value::Object(object) => object.contains_key(ROWS_FIELD),
        _ => false,
    };

    if !is_collection {
        return decode_row(raw);
    }

    let mut rows = normalize_rows(raw)?;
    match rows.len() {
        1 => Ok(rows.remove(0)),
        count => Err(schema(format!("expected exactly one row in echo, got {count}"))),
    }
}

/// Normalize a table listing
///
/// Accepts a bare array or `{"tables": [...]}`; entries are names or
/// `{"name": ...}` objects.
///
/// # Errors
/// `Schema` for unrecognized shapes or unusable names.
pub fn normalize_tables(raw: Value) -> Result<Vec<TableReference>> {
    Collection::decode(raw, TABLES_FIELD)?
        .into_entries()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| decode_table(entry).map_err(|err| at_index(index, err)))
        .collect()
}

fn decode_row(entry: Value) -> Result<Row> {
    let Value::Object(mut object) = entry else {
        return Err(schema(format!("row must be an object, got {}", type_name(&entry))));
    };

    let id = match object.remove(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => id,
        Some(Value::Number(number)) if number.is_i64() || number.is_u64() => number.to_string(),
        Some(other) => {
            return Err(schema(format!(
                "row `id` must be a non-empty string or an integer, got {}",
                type_name(&other)
            )))
        }
        None => return Err(schema("row has no `id`")),
    };

    // `{id, data: {...}}` wins over the flat form; a flat row may still carry a
    // scalar field that happens to be called `data`.
    let fields: Fields = match object.remove(DATA_FIELD) {
        Some(Value::Object(data)) => data,
        Some(scalar) => {
            object.insert(DATA_FIELD.to_string(), scalar);
            object
        }
        None => object,
    };

    Ok(Row::new(DocumentId::new(id), fields))
}

fn decode_table(entry: Value) -> Result<TableReference> {
    let name = match entry {
        Value::String(name) => name,
        Value::Object(mut object) => match object.remove(NAME_FIELD) {
            Some(Value::String(name)) => name,
            _ => return Err(schema("table entry has no string `name`")),
        },
        other => {
            return Err(schema(format!(
                "table entry must be a name or an object, got {}",
                type_name(&other)
            )))
        }
    };

    TableReference::new(name).map_err(|err| schema(format!("unusable table name: {err}")))
}

fn schema(message: impl Into<String>) -> DataAccessError {
    DataAccessError::Schema(message.into())
}

fn at_index(index: usize, err: DataAccessError) -> DataAccessError {
    match err {
        DataAccessError::Schema(message) => schema(format!("entry {index}: {message}")),
        other => other,
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
