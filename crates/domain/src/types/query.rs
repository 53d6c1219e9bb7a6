//! Immutable row query

use std::collections::BTreeMap;

use serde_json::Value;

use super::table::TableReference;

/// `{table, filters, limit, offset}`
///
/// Built by value; once handed to the client it is only ever borrowed, so
/// an issued query cannot change.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: TableReference,
    filters: BTreeMap<String, Value>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl Query {
    /// Unfiltered query over `table`
    #[must_use]
    pub const fn new(table: TableReference) -> Self {
        Self { table, filters: BTreeMap::new(), limit: None, offset: None }
    }

    /// Query with a prepared filter mapping
    #[must_use]
    pub fn with_filters(table: TableReference, filters: BTreeMap<String, Value>) -> Self {
        Self { table, filters, limit: None, offset: None }
    }

    /// Add an equality filter. A repeated key replaces the earlier value.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Maximum number of rows to return
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of rows to skip
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Target table
    #[must_use]
    pub const fn table(&self) -> &TableReference {
        &self.table
    }

    /// Equality filters, ordered by key
    #[must_use]
    pub const fn filters(&self) -> &BTreeMap<String, Value> {
        &self.filters
    }

    /// Requested limit
    #[must_use]
    pub const fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// Requested offset
    #[must_use]
    pub const fn offset_value(&self) -> Option<u32> {
        self.offset
    }
}
