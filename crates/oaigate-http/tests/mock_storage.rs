//! Mock storage tests for the HTTP transport.
//!
//! These tests use wiremock to stand in for the storage backend and the
//! configuration service.

use std::time::Duration;

use oaigate_core::error::TransportError;
use oaigate_core::{Error, RepositoryConfig, Storage};
use oaigate_http::{StorageClientFactory, fetch_entries, merge_remote_config};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory() -> StorageClientFactory {
    StorageClientFactory::new(Duration::from_secs(2)).unwrap()
}

// ============================================================================
// Storage transport
// ============================================================================

#[tokio::test]
async fn test_get_json_sends_tenant_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance-storage/instances"))
        .and(query_param("offset", "0"))
        .and(header("x-okapi-tenant", "diku"))
        .and(header("x-okapi-token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{"id": "a"}],
            "totalRecords": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = factory()
        .for_tenant("diku", &server.uri(), Some("secret"))
        .unwrap();
    let body = storage
        .get_json("/instance-storage/instances?offset=0&limit=10")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(body["totalRecords"], 1);
}

#[tokio::test]
async fn test_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance-storage/instances/missing/source-record/marc-json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let storage = factory().for_tenant("diku", &server.uri(), None).unwrap();
    let body = storage
        .get_json("/instance-storage/instances/missing/source-record/marc-json")
        .await
        .unwrap();

    assert!(body.is_none());
}

#[tokio::test]
async fn test_server_error_is_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/source-storage/result"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let storage = factory().for_tenant("diku", &server.uri(), None).unwrap();
    let err = storage.get_json("/source-storage/result").await.unwrap_err();

    match err {
        Error::Backend(backend) => {
            assert_eq!(backend.status, 500);
            assert_eq!(backend.body.as_deref(), Some("boom"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_payload_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/source-storage/record/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let storage = factory().for_tenant("diku", &server.uri(), None).unwrap();
    let err = storage.get_json("/source-storage/record/r1").await.unwrap_err();

    assert!(matches!(err, Error::Payload { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance-storage/instances"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"instances": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let storage = StorageClientFactory::new(Duration::from_millis(200))
        .unwrap()
        .for_tenant("diku", &server.uri(), None)
        .unwrap();
    let err = storage
        .get_json("/instance-storage/instances")
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            Error::Transport(TransportError::Timeout { duration_ms: 200 })
        ),
        "got {err:?}"
    );
}

// ============================================================================
// Remote configuration
// ============================================================================

#[tokio::test]
async fn test_fetch_configuration_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/configurations/entries"))
        .and(query_param("query", "module==OAI-PMH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "configs": [
                {"module": "OAI-PMH", "code": "repository.name", "value": "Remote"},
                {"module": "OAI-PMH", "code": "repository.maxRecordsPerResponse", "value": "7"}
            ],
            "totalRecords": 2
        })))
        .mount(&server)
        .await;

    let storage = factory().for_tenant("diku", &server.uri(), None).unwrap();
    let entries = fetch_entries(&storage).await.unwrap();
    assert_eq!(entries.len(), 2);

    let mut config = RepositoryConfig::new("http://localhost/oai", "admin@localhost");
    let merged = merge_remote_config(&mut config, &storage).await;
    assert_eq!(merged, 2);
    assert_eq!(config.name, "Remote");
    assert_eq!(config.max_records_per_response, 7);
}

#[tokio::test]
async fn test_configuration_failure_keeps_local_settings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/configurations/entries"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let storage = factory().for_tenant("diku", &server.uri(), None).unwrap();
    let mut config = RepositoryConfig::new("http://localhost/oai", "admin@localhost");
    let before = config.clone();

    assert_eq!(merge_remote_config(&mut config, &storage).await, 0);
    assert_eq!(config, before);
}
