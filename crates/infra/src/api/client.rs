//! Table client: the CRUD façade
//!
//! Callers speak in tables and documents. Every operation goes through the
//! [`RequestExecutor`] and the response normalizer, and reports exactly one
//! [`OperationEvent`] to the registered hook once its outcome is known.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use rowbridge_core::{Authenticator, CallOptions, DocumentStore, NoopHook, OperationHook};
use rowbridge_domain::{
    ClientConfig, DataAccessError, Document, DocumentId, Fields, OperationEvent, OperationKind,
    OperationOutcome, Query, Result, TableReference, Token,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::auth::HttpAuthenticator;
use super::endpoints::Endpoints;
use super::executor::{RequestExecutor, WireOperation};
use super::normalize::{normalize_row, normalize_rows, normalize_tables};
use super::token_manager::{AuthState, TokenManager};
use crate::http::HttpClient;

/// Client for one project of the tabular service
///
/// Cheap to clone; clones share the token state and the hook.
#[derive(Clone)]
pub struct TableClient {
    endpoints: Endpoints,
    executor: RequestExecutor,
    hook: Arc<dyn OperationHook>,
    default_deadline: Option<Duration>,
}

impl TableClient {
    /// Start building a client from `config`
    pub fn builder(config: ClientConfig) -> TableClientBuilder {
        TableClientBuilder::new(config)
    }

    /// Client with the HTTP authenticator and no hook
    ///
    /// # Errors
    /// `DataAccessError::Config` if `config` does not validate.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Log in now instead of on the first operation
    ///
    /// # Errors
    /// `Authentication` for a rejected credential, `TransientNetwork` for
    /// connectivity failures.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<Token> {
        self.executor.tokens().authenticate().await
    }

    /// Current phase of the token state machine
    pub fn auth_state(&self) -> AuthState {
        self.executor.tokens().state()
    }

    /// Authentication exchanges started by this client (and its clones)
    pub fn authentication_count(&self) -> u64 {
        self.executor.tokens().authentication_count()
    }

    /// Tables visible in the project
    ///
    /// Read-only; reported as a query without a table.
    #[instrument(skip(self, options))]
    pub async fn list_tables(&self, options: &CallOptions) -> Result<Vec<TableReference>> {
        let operation =
            WireOperation::new(OperationKind::Query, Method::GET, self.endpoints.tables());
        self.dispatch(None, OperationKind::Query, Ok(operation), options, normalize_tables).await
    }

    /// Documents matching `query`, in server order
    ///
    /// # Errors
    /// `InvalidInput` for non-scalar filter values, before any I/O.
    #[instrument(skip(self, query, options), fields(table = %query.table()))]
    pub async fn query(&self, query: &Query, options: &CallOptions) -> Result<Vec<Document>> {
        let operation = query_params(query).map(|params| {
            WireOperation::new(OperationKind::Query, Method::GET, self.endpoints.rows(query.table()))
                .with_query(params)
        });

        self.dispatch(Some(query.table()), OperationKind::Query, operation, options, |raw| {
            normalize_rows(raw).map(|rows| rows.into_iter().map(Document::from).collect())
        })
        .await
    }

    /// Single document by identifier
    ///
    /// # Errors
    /// `NotFound` if the row does not exist.
    #[instrument(skip(self, table, id, options), fields(table = %table, id = %id))]
    pub async fn get(
        &self,
        table: &TableReference,
        id: &DocumentId,
        options: &CallOptions,
    ) -> Result<Document> {
        let operation = self
            .endpoints
            .row(table, id)
            .map(|url| WireOperation::new(OperationKind::Query, Method::GET, url));
        self.dispatch(Some(table), OperationKind::Query, operation, options, decode_document)
            .await
    }

    /// Insert a row and return the stored document
    ///
    /// Not resubmitted after a transport failure unless `options` carries an
    /// idempotency key.
    #[instrument(skip(self, table, fields, options), fields(table = %table))]
    pub async fn create(
        &self,
        table: &TableReference,
        fields: Fields,
        options: &CallOptions,
    ) -> Result<Document> {
        let operation =
            WireOperation::new(OperationKind::Create, Method::POST, self.endpoints.rows(table))
                .with_body(json!({ "data": fields }))
                .with_idempotency_key(options.idempotency_key.clone());
        self.dispatch(Some(table), OperationKind::Create, Ok(operation), options, decode_document)
            .await
    }

    /// Replace fields of an existing row
    ///
    /// # Errors
    /// `NotFound` if `id` does not exist.
    #[instrument(skip(self, table, id, fields, options), fields(table = %table, id = %id))]
    pub async fn update(
        &self,
        table: &TableReference,
        id: &DocumentId,
        fields: Fields,
        options: &CallOptions,
    ) -> Result<Document> {
        let operation = self.endpoints.row(table, id).map(|url| {
            WireOperation::new(OperationKind::Update, Method::PUT, url)
                .with_body(json!({ "data": fields }))
                .with_idempotency_key(options.idempotency_key.clone())
        });
        self.dispatch(Some(table), OperationKind::Update, operation, options, decode_document)
            .await
    }

    /// Remove a row
    ///
    /// # Errors
    /// `NotFound` if `id` does not exist, so a repeated delete fails the
    /// second time.
    #[instrument(skip(self, table, id, options), fields(table = %table, id = %id))]
    pub async fn delete(
        &self,
        table: &TableReference,
        id: &DocumentId,
        options: &CallOptions,
    ) -> Result<()> {
        let operation = self.endpoints.row(table, id).map(|url| {
            WireOperation::new(OperationKind::Delete, Method::DELETE, url)
                .with_idempotency_key(options.idempotency_key.clone())
                .discard_body()
        });
        self.dispatch(Some(table), OperationKind::Delete, operation, options, |_| Ok(())).await
    }

    async fn dispatch<T>(
        &self,
        table: Option<&TableReference>,
        kind: OperationKind,
        operation: Result<WireOperation>,
        options: &CallOptions,
        decode: impl FnOnce(Value) -> Result<T>,
    ) -> Result<T> {
        let started = Instant::now();

        let (result, retry_count) = match operation {
            Ok(operation) => {
                let deadline = options.deadline.or(self.default_deadline);
                let execution = self.executor.execute(&operation, deadline).await;
                (execution.result.and_then(decode), execution.retry_count)
            }
            Err(err) => (Err(err), 0),
        };

        let event = OperationEvent {
            table: table.cloned(),
            kind,
            duration: started.elapsed(),
            outcome: OperationOutcome::of(&result),
            retry_count,
            occurred_at: Utc::now(),
        };
        debug!(
            kind = %event.kind,
            outcome = event.outcome.label(),
            retry_count,
            elapsed_ms = u64::try_from(event.duration.as_millis()).unwrap_or(u64::MAX),
            "Operation finished"
        );
        self.hook.on_operation(&event);

        result
    }
}

impl fmt::Debug for TableClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableClient")
            .field("project", self.endpoints.project())
            .field("default_deadline", &self.default_deadline)
            .field("auth_state", &self.auth_state())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DocumentStore for TableClient {
    async fn query(&self, query: &Query, options: &CallOptions) -> Result<Vec<Document>> {
        Self::query(self, query, options).await
    }

    async fn create(
        &self,
        table: &TableReference,
        fields: Fields,
        options: &CallOptions,
    ) -> Result<Document> {
        Self::create(self, table, fields, options).await
    }

    async fn update(
        &self,
        table: &TableReference,
        id: &DocumentId,
        fields: Fields,
        options: &CallOptions,
    ) -> Result<Document> {
        Self::update(self, table, id, fields, options).await
    }

    async fn delete(
        &self,
        table: &TableReference,
        id: &DocumentId,
        options: &CallOptions,
    ) -> Result<()> {
        Self::delete(self, table, id, options).await
    }
}

/// Builder for [`TableClient`]
pub struct TableClientBuilder {
    config: ClientConfig,
    hook: Option<Arc<dyn OperationHook>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl TableClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self { config, hook: None, authenticator: None }
    }

    /// Hook notified after every operation
    #[must_use]
    pub fn hook(mut self, hook: Arc<dyn OperationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Replace the HTTP login exchange
    #[must_use]
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// # Errors
    /// `DataAccessError::Config` for invalid configuration or an HTTP client
    /// that cannot be constructed.
    pub fn build(self) -> Result<TableClient> {
        let config = self.config;
        config.validate()?;

        let http_client = HttpClient::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let endpoints = Endpoints::new(&config.base_url, config.project_scope()?)?;

        let authenticator = self.authenticator.unwrap_or_else(|| {
            Arc::new(HttpAuthenticator::new(http_client.clone(), endpoints.clone()))
        });
        let tokens = Arc::new(TokenManager::new(authenticator, config.credential()));

        Ok(TableClient {
            endpoints,
            executor: RequestExecutor::new(http_client, tokens, config.retry),
            hook: self.hook.unwrap_or_else(|| Arc::new(NoopHook)),
            default_deadline: config.default_deadline(),
        })
    }
}

impl fmt::Debug for TableClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableClientBuilder")
            .field("config", &self.config)
            .field("hook", &self.hook.is_some())
            .field("authenticator", &self.authenticator.is_some())
            .finish()
    }
}

fn decode_document(raw: Value) -> Result<Document> {
    normalize_row(raw).map(Document::from)
}

/// `limit`, `offset` and `filter[key]=value` pairs for a row listing
fn query_params(query: &Query) -> Result<Vec<(String, String)>> {
    let mut params = Vec::with_capacity(query.filters().len() + 2);

    if let Some(limit) = query.limit_value() {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.offset_value() {
        params.push(("offset".to_string(), offset.to_string()));
    }

    for (key, value) in query.filters() {
        if key.is_empty() {
            return Err(DataAccessError::InvalidInput("filter key must not be empty".into()));
        }
        let rendered = match value {
            Value::String(text) => text.clone(),
            Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(DataAccessError::InvalidInput(format!(
                    "filter `{key}` must be a scalar value"
                )))
            }
        };
        params.push((format!("filter[{key}]"), rendered));
    }

    Ok(params)
}
