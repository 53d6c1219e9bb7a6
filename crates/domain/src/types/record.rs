//! Wire rows and the caller-facing documents derived from them

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::table::validate_segment;
use crate::errors::Result;

/// Field mapping of a row or document
pub type Fields = Map<String, Value>;

/// Stable identifier of a row, carried unchanged into its [`Document`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Wrap an identifier, rejecting values that cannot address a single row
    ///
    /// # Errors
    /// Returns `InvalidInput` for empty identifiers and for `.` or `..`.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = Self(id.into());
        id.validate()?;
        Ok(id)
    }

    /// Check that this identifier is usable as a row path segment
    ///
    /// # Errors
    /// Returns `InvalidInput` for empty identifiers and for `.` or `..`.
    pub fn validate(&self) -> Result<()> {
        validate_segment("row id", &self.0)
    }

    /// Identifier as a path segment
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Wire-level record, already reduced to `{identifier, fields}`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: DocumentId,
    fields: Fields,
}

impl Row {
    /// Assemble a row from a decoded identifier and data mapping
    #[must_use]
    pub const fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Row identifier
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Row data
    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Canonical record returned to callers
///
/// Only obtainable from a normalized [`Row`]; the `id` is the row identifier
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    id: DocumentId,
    fields: Fields,
}

impl Document {
    /// Document identifier
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// All fields
    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Single field lookup
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Take ownership of the identifier and fields
    #[must_use]
    pub fn into_parts(self) -> (DocumentId, Fields) {
        (self.id, self.fields)
    }
}

impl From<Row> for Document {
    fn from(row: Row) -> Self {
        Self { id: row.id, fields: row.fields }
    }
}
