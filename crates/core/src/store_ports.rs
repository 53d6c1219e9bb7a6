//! CRUD façade contract
//!
//! The only interface the rest of an application depends on. Callers speak in
//! terms of tables and documents; the remote row vocabulary and wire shapes
//! stay behind the implementation.

use std::time::Duration;

use async_trait::async_trait;
use rowbridge_domain::{Document, DocumentId, Fields, IdempotencyKey, Query, Result, TableReference};

/// Per-call knobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Budget for the whole logical operation, re-authentication and retries
    /// included. Exceeding it yields `DataAccessError::Timeout`.
    pub deadline: Option<Duration>,
    /// Makes a mutation safe to resubmit after a transient network failure.
    pub idempotency_key: Option<IdempotencyKey>,
}

impl CallOptions {
    /// Options with a deadline
    #[must_use]
    pub fn with_deadline(deadline: Duration) -> Self {
        Self { deadline: Some(deadline), ..Self::default() }
    }

    /// Options with an idempotency key
    #[must_use]
    pub fn with_idempotency_key(key: IdempotencyKey) -> Self {
        Self { idempotency_key: Some(key), ..Self::default() }
    }
}

/// Document-level CRUD over a project-scoped tabular store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch documents matching `query`. An empty result is `Ok(vec![])`.
    async fn query(&self, query: &Query, options: &CallOptions) -> Result<Vec<Document>>;

    /// Insert a new row and return it with its server-assigned identifier
    async fn create(
        &self,
        table: &TableReference,
        fields: Fields,
        options: &CallOptions,
    ) -> Result<Document>;

    /// Replace fields on an existing row; `NotFound` if `id` is absent
    async fn update(
        &self,
        table: &TableReference,
        id: &DocumentId,
        fields: Fields,
        options: &CallOptions,
    ) -> Result<Document>;

    /// Remove a row; `NotFound` if `id` is absent, including on a second delete
    async fn delete(
        &self,
        table: &TableReference,
        id: &DocumentId,
        options: &CallOptions,
    ) -> Result<()>;
}
