//! Integration tests for `TableClient` against a mocked tabular service
//!
//! **Coverage:**
//! - End-to-end query with a mid-session token rejection
//! - CRUD operations, typed not-found, and schema failures
//! - Serialized authentication under concurrent load
//! - Read retry vs. write no-retry after transport failures
//! - Deadlines and observability events
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the remote service
//! - Real `TableClient` with the HTTP authenticator unless noted

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rowbridge_core::{CallOptions, DocumentStore};
use rowbridge_domain::{
    DataAccessError, DocumentId, ErrorKind, Fields, IdempotencyKey, OperationKind,
    OperationOutcome, Query, TableReference, Token,
};
use rowbridge_infra::{AuthState, TableClient};
use serde_json::json;
use support::{
    client_for, config_for, mount_login, refused_base_url, row_path, rows_path, RecordingHook,
    StaticAuthenticator, PROJECT,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn users() -> TableReference {
    TableReference::new("users").unwrap()
}

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_query_reauthenticates_once_after_rejection() {
    support::init_tracing();
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;
    mount_login(&server, "T2", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .and(header("authorization", "Bearer T1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .and(header("authorization", "Bearer T2"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [{"id": "u1", "data": {"email": "a@b.com"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    assert_eq!(client.authenticate().await.unwrap(), Token::new("T1"));

    let documents =
        client.query(&Query::new(users()).limit(10), &CallOptions::default()).await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id().as_str(), "u1");
    assert_eq!(documents[0].fields(), &fields(json!({"email": "a@b.com"})));
    assert_eq!(client.authentication_count(), 2);
    assert_eq!(client.auth_state(), AuthState::Valid);

    let events = hook.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, OperationKind::Query);
    assert_eq!(events[0].outcome, OperationOutcome::Success);
    assert_eq!(events[0].retry_count, 1);
    assert_eq!(events[0].table, Some(users()));
}

#[tokio::test]
async fn test_repeated_rejection_surfaces_authentication_error() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;
    mount_login(&server, "T2", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    let err = client.query(&Query::new(users()), &CallOptions::default()).await.unwrap_err();

    assert!(matches!(err, DataAccessError::Authentication(_)), "{err:?}");
    assert_eq!(
        hook.events()[0].outcome,
        OperationOutcome::Failure(ErrorKind::Authentication)
    );
}

#[tokio::test]
async fn test_forbidden_after_reauthentication_is_authorization_error() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;
    mount_login(&server, "T2", 1).await;

    Mock::given(method("DELETE"))
        .and(path(row_path("users", "u1")))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let err = client
        .delete(&users(), &DocumentId::from("u1"), &CallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Authorization(_)), "{err:?}");
}

#[tokio::test]
async fn test_bad_credential_fails_eager_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let err = client.authenticate().await.unwrap_err();

    assert!(matches!(err, DataAccessError::Authentication(_)));
    assert_eq!(client.auth_state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_concurrent_first_calls_share_one_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "T1"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(16)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let calls = (0..16).map(|_| {
        let client = client.clone();
        tokio::spawn(async move {
            client.query(&Query::new(users()), &CallOptions::default()).await
        })
    });

    for result in join_all(calls).await {
        assert!(result.unwrap().unwrap().is_empty());
    }
    assert_eq!(client.authentication_count(), 1);
}

#[tokio::test]
async fn test_concurrent_rejections_trigger_one_reauthentication() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;
    mount_login(&server, "T2", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .expect(8)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    client.authenticate().await.unwrap();

    let calls = (0..8).map(|_| {
        let client = client.clone();
        tokio::spawn(async move {
            client.query(&Query::new(users()), &CallOptions::default()).await
        })
    });
    for result in join_all(calls).await {
        assert!(result.unwrap().is_ok());
    }

    assert_eq!(client.authentication_count(), 2);
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn test_query_translates_filters_and_paging() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .and(query_param("filter[status]", "active"))
        .and(query_param("filter[age]", "30"))
        .and(query_param("limit", "5"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "status": "active", "age": 30},
            {"id": 2, "status": "active", "age": 30},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let query = Query::new(users()).filter("status", "active").filter("age", 30).limit(5).offset(10);
    let documents = client.query(&query, &CallOptions::default()).await.unwrap();

    let ids: Vec<_> = documents.iter().map(|d| d.id().as_str().to_string()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(documents[1].get("status"), Some(&json!("active")));
}

#[tokio::test]
async fn test_invalid_filter_fails_before_any_request() {
    let server = MockServer::start().await;
    let (client, hook) = client_for(&server);

    let query = Query::new(users()).filter("tags", json!(["a"]));
    let err = client.query(&query, &CallOptions::default()).await.unwrap_err();

    assert!(matches!(err, DataAccessError::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(hook.events().len(), 1);
    assert_eq!(client.authentication_count(), 0);
}

#[tokio::test]
async fn test_relative_row_ids_fail_before_any_request() {
    let server = MockServer::start().await;
    let (client, hook) = client_for(&server);
    let options = CallOptions::default();

    for id in ["..", ".", ""] {
        let id = DocumentId::from(id);
        let err = client.delete(&users(), &id, &options).await.unwrap_err();
        assert!(matches!(err, DataAccessError::InvalidInput(_)), "delete {id:?}: {err:?}");

        let err = client.update(&users(), &id, Fields::new(), &options).await.unwrap_err();
        assert!(matches!(err, DataAccessError::InvalidInput(_)), "update {id:?}: {err:?}");

        let err = client.get(&users(), &id, &options).await.unwrap_err();
        assert!(matches!(err, DataAccessError::InvalidInput(_)), "get {id:?}: {err:?}");
    }

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(client.authentication_count(), 0);
    let events = hook.events();
    assert_eq!(events.len(), 9);
    assert!(events
        .iter()
        .all(|event| event.outcome == OperationOutcome::Failure(ErrorKind::InvalidInput)));
}

#[tokio::test]
async fn test_unrecognized_payload_is_schema_error() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    let err = client.query(&Query::new(users()), &CallOptions::default()).await.unwrap_err();

    assert!(matches!(err, DataAccessError::Schema(_)));
    assert_eq!(hook.events()[0].outcome, OperationOutcome::Failure(ErrorKind::Schema));
}

#[tokio::test]
async fn test_create_returns_server_assigned_id() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("POST"))
        .and(path(rows_path("users")))
        .and(header("authorization", "Bearer T1"))
        .and(body_json(json!({"data": {"email": "c@d.com"}})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 7, "data": {"email": "c@d.com"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    let document = client
        .create(&users(), fields(json!({"email": "c@d.com"})), &CallOptions::default())
        .await
        .unwrap();

    assert_eq!(document.id(), &DocumentId::from("7"));
    assert_eq!(document.get("email"), Some(&json!("c@d.com")));
    assert_eq!(hook.events()[0].kind, OperationKind::Create);
}

#[tokio::test]
async fn test_update_and_get() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("PUT"))
        .and(path(row_path("users", "u1")))
        .and(body_json(json!({"data": {"name": "Ada"}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"rows": [{"id": "u1", "name": "Ada"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(row_path("users", "u1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "data": {"name": "Ada"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let id = DocumentId::from("u1");
    let updated = client
        .update(&users(), &id, fields(json!({"name": "Ada"})), &CallOptions::default())
        .await
        .unwrap();
    let fetched = client.get(&users(), &id, &CallOptions::default()).await.unwrap();

    assert_eq!(updated, fetched);
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("PUT"))
        .and(path(row_path("users", "ghost")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let err = client
        .update(&users(), &DocumentId::from("ghost"), Fields::new(), &CallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DataAccessError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_twice_yields_success_then_not_found() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("DELETE"))
        .and(path(row_path("users", "u1")))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(row_path("users", "u1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "row not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    let id = DocumentId::from("u1");

    client.delete(&users(), &id, &CallOptions::default()).await.unwrap();
    let err = client.delete(&users(), &id, &CallOptions::default()).await.unwrap_err();

    assert!(matches!(err, DataAccessError::NotFound(_)), "{err:?}");
    let outcomes: Vec<_> = hook.events().iter().map(|e| e.outcome).collect();
    assert_eq!(
        outcomes,
        vec![OperationOutcome::Success, OperationOutcome::Failure(ErrorKind::NotFound)]
    );
}

#[tokio::test]
async fn test_list_tables() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/projects/{PROJECT}/tables")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"tables": [{"name": "users"}, "orders"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    let tables = client.list_tables(&CallOptions::default()).await.unwrap();

    assert_eq!(tables, vec![users(), TableReference::new("orders").unwrap()]);
    assert_eq!(hook.events()[0].table, None);
}

#[tokio::test]
async fn test_usable_through_document_store_port() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "u1"}])))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let store: Arc<dyn DocumentStore> = Arc::new(client);
    let documents = store.query(&Query::new(users()), &CallOptions::default()).await.unwrap();

    assert_eq!(documents.len(), 1);
    assert!(documents[0].fields().is_empty());
}

// ============================================================================
// Transport failures and deadlines
// ============================================================================

fn offline_client() -> (TableClient, Arc<RecordingHook>) {
    let hook = Arc::new(RecordingHook::default());
    let client = TableClient::builder(config_for(refused_base_url()))
        .authenticator(Arc::new(StaticAuthenticator(Token::new("T1"))))
        .hook(hook.clone())
        .build()
        .unwrap();
    (client, hook)
}

#[tokio::test]
async fn test_reads_retry_and_writes_do_not() {
    let (client, hook) = offline_client();

    let read = client.query(&Query::new(users()), &CallOptions::default()).await;
    let write = client.create(&users(), Fields::new(), &CallOptions::default()).await;

    assert!(matches!(read, Err(DataAccessError::TransientNetwork(_))));
    assert!(matches!(write, Err(DataAccessError::TransientNetwork(_))));

    let events = hook.events();
    assert_eq!(events[0].retry_count, 2);
    assert_eq!(events[1].retry_count, 0);
    assert_eq!(events[1].outcome, OperationOutcome::Failure(ErrorKind::TransientNetwork));
}

#[tokio::test]
async fn test_writes_with_idempotency_key_retry() {
    let (client, hook) = offline_client();
    let options = CallOptions::with_idempotency_key(IdempotencyKey::generate());

    let id = DocumentId::from("u1");
    let _ = client.update(&users(), &id, Fields::new(), &options).await;
    let _ = client.delete(&users(), &id, &options).await;

    let retries: Vec<_> = hook.events().iter().map(|e| e.retry_count).collect();
    assert_eq!(retries, vec![2, 2]);
}

#[tokio::test]
async fn test_deadline_surfaces_timeout() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let (client, hook) = client_for(&server);
    let deadline = Duration::from_millis(200);
    let err = client
        .query(&Query::new(users()), &CallOptions::with_deadline(deadline))
        .await
        .unwrap_err();

    assert_eq!(err, DataAccessError::Timeout(deadline));
    assert_eq!(hook.events()[0].outcome, OperationOutcome::Failure(ErrorKind::Timeout));
}

#[tokio::test]
async fn test_configured_default_deadline_applies() {
    let server = MockServer::start().await;
    mount_login(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path(rows_path("users")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let mut config = config_for(server.uri());
    config.default_deadline_secs = Some(1);
    let client = TableClient::from_config(config).unwrap();

    let err = client.query(&Query::new(users()), &CallOptions::default()).await.unwrap_err();
    assert_eq!(err, DataAccessError::Timeout(Duration::from_secs(1)));
}
