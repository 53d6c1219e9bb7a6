//! Request executor
//!
//! Sends one logical operation to the remote service and owns every
//! resubmission decision:
//!
//! - 401/403: invalidate the token and resubmit exactly once. A second
//!   rejection surfaces as `Authentication` (401) or `Authorization` (403).
//!   A repeated 403 is not folded into `Authentication`: the fresh identity
//!   was accepted and lacks the privilege, so it keeps the status-derived kind.
//! - Transport failure: resubmit read-only operations, or mutations carrying
//!   an idempotency key, up to [`RetryPolicy::max_read_retries`] times with a
//!   fixed capped delay. Other mutations fail immediately.
//! - Any other non-success status: surface it without retry.
//!
//! An optional deadline bounds the whole run, re-authentication and retry
//! sleeps included.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use rowbridge_domain::constants::IDEMPOTENCY_KEY_HEADER;
use rowbridge_domain::{
    DataAccessError, IdempotencyKey, OperationKind, Result, RetryPolicy, Token,
};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::token_manager::TokenManager;
use crate::errors::{status_error, InfraError};
use crate::http::HttpClient;

/// One HTTP exchange as the executor sees it
#[derive(Debug, Clone)]
pub struct WireOperation {
    kind: OperationKind,
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    body: Option<Value>,
    idempotency_key: Option<IdempotencyKey>,
    read_body: bool,
}

impl WireOperation {
    /// Operation without query, body or idempotency key
    pub fn new(kind: OperationKind, method: Method, url: Url) -> Self {
        Self {
            kind,
            method,
            url,
            query: Vec::new(),
            body: None,
            idempotency_key: None,
            read_body: true,
        }
    }

    /// Append query-string pairs
    #[must_use]
    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// JSON request body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_idempotency_key(mut self, key: Option<IdempotencyKey>) -> Self {
        self.idempotency_key = key;
        self
    }

    /// Ignore the response body; success yields `Value::Null`
    #[must_use]
    pub const fn discard_body(mut self) -> Self {
        self.read_body = false;
        self
    }

    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Safe to send again after a transport failure
    pub const fn is_resubmittable(&self) -> bool {
        self.kind.is_read_only() || self.idempotency_key.is_some()
    }

    fn describe(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }
}

/// Result of one logical operation plus how many resubmissions it took
#[derive(Debug)]
pub struct Execution {
    pub result: Result<Value>,
    /// Re-authentication resubmissions plus transport retries
    pub retry_count: u32,
}

/// Executes [`WireOperation`]s with bearer authentication and bounded retry
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http_client: HttpClient,
    tokens: Arc<TokenManager>,
    retry: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(http_client: HttpClient, tokens: Arc<TokenManager>, retry: RetryPolicy) -> Self {
        Self { http_client, tokens, retry }
    }

    /// Token manager shared with this executor
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Run `operation` to completion or until `deadline` elapses
    ///
    /// On expiry the in-flight request is dropped and the result is
    /// `DataAccessError::Timeout`; the retry count reflects the
    /// resubmissions made before that.
    pub async fn execute(&self, operation: &WireOperation, deadline: Option<Duration>) -> Execution {
        let mut retry_count = 0;

        let result = match deadline {
            Some(limit) => {
                match tokio::time::timeout(limit, self.run(operation, &mut retry_count)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(operation = %operation.describe(), ?limit, "Deadline exceeded");
                        Err(DataAccessError::Timeout(limit))
                    }
                }
            }
            None => self.run(operation, &mut retry_count).await,
        };

        Execution { result, retry_count }
    }

    async fn run(&self, operation: &WireOperation, retry_count: &mut u32) -> Result<Value> {
        let mut reauthenticated = false;
        let mut transport_retries = 0;

        loop {
            let token = self.tokens.ensure_valid().await?;

            let response = match self.http_client.send(self.request(operation, &token)).await {
                Ok(response) => response,
                Err(err)
                    if err.is_retryable()
                        && operation.is_resubmittable()
                        && transport_retries < self.retry.max_read_retries =>
                {
                    transport_retries += 1;
                    *retry_count += 1;
                    let delay = self.retry.delay();
                    warn!(
                        operation = %operation.describe(),
                        attempt = transport_retries,
                        ?delay,
                        error = %err,
                        "Transient failure, resubmitting"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let status = response.status();
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                if reauthenticated {
                    warn!(operation = %operation.describe(), %status, "Rejected after re-authentication");
                    return Err(Self::failure(operation, response).await);
                }

                debug!(operation = %operation.describe(), %status, "Token rejected, re-authenticating");
                reauthenticated = true;
                *retry_count += 1;
                self.tokens.invalidate(&token);
                continue;
            }

            if !status.is_success() {
                return Err(Self::failure(operation, response).await);
            }

            return Self::decode(operation, response).await;
        }
    }

    fn request(&self, operation: &WireOperation, token: &Token) -> RequestBuilder {
        let mut builder = self
            .http_client
            .request(operation.method.clone(), operation.url.clone())
            .bearer_auth(token.expose());

        if !operation.query.is_empty() {
            builder = builder.query(&operation.query);
        }
        if let Some(body) = &operation.body {
            builder = builder.json(body);
        }
        if let Some(key) = &operation.idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key.as_str());
        }

        builder
    }

    async fn failure(operation: &WireOperation, response: Response) -> DataAccessError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        status_error(status, &operation.describe(), body)
    }

    async fn decode(operation: &WireOperation, response: Response) -> Result<Value> {
        if !operation.read_body {
            return Ok(Value::Null);
        }

        let bytes = response.bytes().await.map_err(InfraError::from)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|err| InfraError::from(err).into())
    }
}
