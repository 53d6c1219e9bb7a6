//! Shared fixtures for infra integration tests.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rowbridge_core::{Authenticator, OperationHook};
use rowbridge_domain::{ClientConfig, Credential, OperationEvent, Result, RetryPolicy, Token};
use rowbridge_infra::TableClient;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "x";
pub const PROJECT: &str = "proj_1";

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fast retry policy so transport-failure tests finish quickly.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy { max_read_retries: 2, retry_delay_ms: 10, max_retry_delay_ms: 50 }
}

/// Client configuration pointing at `base_url`.
pub fn config_for(base_url: impl Into<String>) -> ClientConfig {
    let mut config = ClientConfig::new(base_url, PROJECT, EMAIL, PASSWORD);
    config.request_timeout_secs = 5;
    config.retry = fast_retry();
    config
}

/// Client against `server` with the HTTP authenticator and a recording hook.
pub fn client_for(server: &MockServer) -> (TableClient, Arc<RecordingHook>) {
    let hook = Arc::new(RecordingHook::default());
    let client = TableClient::builder(config_for(server.uri()))
        .hook(hook.clone())
        .build()
        .expect("client should build");
    (client, hook)
}

/// Base URL on which nothing listens, so every request is refused.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn rows_path(table: &str) -> String {
    format!("/projects/{PROJECT}/tables/{table}/rows")
}

pub fn row_path(table: &str, id: &str) -> String {
    format!("/projects/{PROJECT}/tables/{table}/rows/{id}")
}

/// Answer the next `times` logins with `token`, and expect exactly that many.
pub async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": EMAIL, "password": PASSWORD})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

/// Hook that keeps every event it receives.
#[derive(Default)]
pub struct RecordingHook {
    events: Mutex<Vec<OperationEvent>>,
}

impl RecordingHook {
    pub fn events(&self) -> Vec<OperationEvent> {
        self.events.lock().expect("hook mutex poisoned").clone()
    }
}

impl OperationHook for RecordingHook {
    fn on_operation(&self, event: &OperationEvent) {
        self.events.lock().expect("hook mutex poisoned").push(event.clone());
    }
}

/// Authenticator that never touches the network.
pub struct StaticAuthenticator(pub Token);

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, _credential: &Credential) -> Result<Token> {
        Ok(self.0.clone())
    }
}
