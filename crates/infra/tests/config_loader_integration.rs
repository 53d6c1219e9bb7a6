//! Integration tests for configuration loader
//!
//! Tests loading configuration from files and driving a client with it.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::io::Write;
use std::path::PathBuf;

use rowbridge_core::CallOptions;
use rowbridge_domain::{DataAccessError, Query, TableReference};
use rowbridge_infra::{config, TableClient};
use serde_json::json;
use support::{mount_login, rows_path, EMAIL, PASSWORD, PROJECT};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[tokio::test]
async fn test_client_from_json_config_file() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;
    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "u1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let contents = json!({
        "base_url": server.uri(),
        "project_id": PROJECT,
        "email": EMAIL,
        "password": PASSWORD,
        "default_deadline_secs": 5,
    })
    .to_string();
    let path = write_config(&contents, "json");

    let config = config::load_from_file(Some(path.clone())).expect("config should load");
    assert_eq!(config.default_deadline_secs, Some(5));

    let client = TableClient::from_config(config).expect("client should build");
    let documents = client
        .query(&Query::new(TableReference::new("users").unwrap()), &CallOptions::default())
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_config(
        r#"
base_url = "https://tables.example.com/api"
project_id = "proj_9"
email = "ops@example.com"
password = "secret"
request_timeout_secs = 10
user_agent = "inventory-sync/2.1"

[retry]
max_read_retries = 3
retry_delay_ms = 100
max_retry_delay_ms = 400
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    assert_eq!(config.project_id, "proj_9");
    assert_eq!(config.user_agent, "inventory-sync/2.1");
    assert_eq!(config.request_timeout_secs, 10);
    assert_eq!(config.retry.max_read_retries, 3);
    assert_eq!(config.retry.delay().as_millis(), 100);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let path = write_config(
        r#"{
            "base_url": "https://tables.example.com/api",
            "project_id": "proj_1",
            "email": "a@b.com",
            "password": "x"
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    assert_eq!(config.default_deadline_secs, None);
    assert_eq!(config.retry.max_read_retries, 2);
    assert!(config.user_agent.starts_with("rowbridge/"));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_serialized_config_omits_password() {
    let path = write_config(
        r#"{
            "base_url": "https://tables.example.com/api",
            "project_id": "proj_1",
            "email": "a@b.com",
            "password": "hunter2"
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");
    let rendered = serde_json::to_string(&config).unwrap();
    assert!(!rendered.contains("hunter2"));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/config.json".into()));

    match result {
        Err(DataAccessError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    match config::load_from_file(Some(path.clone())) {
        Err(DataAccessError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}
