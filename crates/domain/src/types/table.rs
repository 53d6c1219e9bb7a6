//! Project scope and table naming

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DataAccessError, Result};

/// Reject values that cannot stand alone as one URL path segment.
///
/// `.` and `..` are collapsed by URL normalization and would address a
/// parent resource instead of the named one.
pub(crate) fn validate_segment(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DataAccessError::InvalidInput(format!("{kind} must not be empty")));
    }
    if matches!(value, "." | "..") {
        return Err(DataAccessError::InvalidInput(format!(
            "{kind} must not be a relative path segment: '{value}'"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(DataAccessError::InvalidInput(format!(
            "{kind} must not contain control characters"
        )));
    }
    Ok(())
}

/// Tenant identifier embedded in every remote path. Fixed per client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectScope(String);

impl ProjectScope {
    /// Validate and wrap a project identifier
    ///
    /// # Errors
    /// Returns `InvalidInput` for empty identifiers.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_segment("project id", &id)?;
        Ok(Self(id))
    }

    /// Identifier as a path segment
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectScope {
    type Error = DataAccessError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ProjectScope> for String {
    fn from(value: ProjectScope) -> Self {
        value.0
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a remote table within the client's project scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableReference(String);

impl TableReference {
    /// Validate and wrap a table name
    ///
    /// # Errors
    /// Returns `InvalidInput` for empty names.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_segment("table name", &name)?;
        Ok(Self(name))
    }

    /// Table name as a path segment
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableReference {
    type Error = DataAccessError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TableReference> for String {
    fn from(value: TableReference) -> Self {
        value.0
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
