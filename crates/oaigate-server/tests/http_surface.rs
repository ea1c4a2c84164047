//! HTTP surface tests.
//!
//! The router is bound to an ephemeral port and called with reqwest; wiremock
//! stands in for the storage backend.

use std::time::Duration;

use oaigate::Gateway;
use oaigate_core::{BackendKind, RepositoryConfig};
use oaigate_http::StorageClientFactory;
use oaigate_server::routes::{AppState, router};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(storage_url: Option<String>, default_tenant: Option<&str>) -> Self {
        let mut config = RepositoryConfig::new("http://localhost:8081/oai", "admin@localhost");
        config.max_records_per_response = 10;
        config.default_tenant = default_tenant.map(str::to_string);
        let state = AppState {
            gateway: Gateway::new(config, BackendKind::Instances).unwrap(),
            factory: StorageClientFactory::new(Duration::from_secs(2)).unwrap(),
            storage_url,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base, path))
            .header("x-okapi-tenant", "diku")
    }
}

fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Static verbs
// ============================================================================

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(None, None).await;
    let response = server.get("/health").send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_repository_info() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server.get("/repository_info").send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(content_type(&response), "application/xml");
    let body = response.text().await.unwrap();
    assert!(body.contains("<Identify>"));
    assert!(body.contains("<compression>gzip</compression>"));
    assert!(body.contains("<compression>deflate</compression>"));
    assert!(body.contains("<earliestDatestamp>1970-01-01T00:00:00Z</earliestDatestamp>"));
}

#[tokio::test]
async fn test_sets_reject_token() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .get("/sets?resumptionToken=abc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains("<error code=\"badResumptionToken\">"));
}

#[tokio::test]
async fn test_metadata_formats_bad_identifier_is_422() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .get("/metadata_formats?identifier=nonsense")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
}

// ============================================================================
// Harvesting
// ============================================================================

#[tokio::test]
async fn test_identifiers_forward_okapi_headers() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instance-storage/instances"))
        .and(header("x-okapi-tenant", "diku"))
        .and(header("x-okapi-token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{"id": "a"}, {"id": "b"}],
            "totalRecords": 2
        })))
        .expect(1)
        .mount(&backend)
        .await;
    let server = TestServer::start(None, None).await;

    let response = server
        .get("/identifiers?metadataPrefix=oai_dc")
        .header("x-okapi-url", backend.uri())
        .header("x-okapi-token", "secret")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("<identifier>oai:localhost:diku/a</identifier>"));
    assert!(body.contains("<identifier>oai:localhost:diku/b</identifier>"));
    assert!(!body.contains("resumptionToken>"));
}

#[tokio::test]
async fn test_unknown_set_is_404() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .get("/records?metadataPrefix=oai_dc&set=physics")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("set=\"physics\""));
    assert!(body.contains("<error code=\"noRecordsMatch\">"));
}

#[tokio::test]
async fn test_get_record_foreign_identifier_is_400() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .get("/records/oai%3Aelsewhere%3Adiku%2Fabc?metadataPrefix=oai_dc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains("<error code=\"badArgument\">"));
    assert!(!body.contains("<GetRecord>"));
}

#[tokio::test]
async fn test_get_record_by_path() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instance-storage/instances"))
        .and(query_param("query", "id==abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{"id": "abc"}],
            "totalRecords": 1
        })))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/instance-storage/instances/abc/source-record/marc-json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leader": "00000nam a2200000 a 4500",
            "fields": [{"245": {"ind1": "0", "ind2": "0", "subfields": [{"a": "Dune"}]}}]
        })))
        .mount(&backend)
        .await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .get("/records/oai%3Alocalhost%3Adiku%2Fabc?metadataPrefix=oai_dc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("<GetRecord>"));
    assert!(body.contains("<dc:title>Dune</dc:title>"));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_backend_error_is_plain_500() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instance-storage/instances"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&backend)
        .await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .get("/records?metadataPrefix=marc21")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(content_type(&response), "text/plain");
    assert_eq!(response.text().await.unwrap(), "Internal Server Error");
}

#[tokio::test]
async fn test_missing_tenant_uses_default() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), Some("fallback")).await;

    let response = server
        .client
        .get(format!("{}/repository_info", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_missing_tenant_without_default_is_400() {
    let backend = MockServer::start().await;
    let server = TestServer::start(Some(backend.uri()), None).await;

    let response = server
        .client
        .get(format!("{}/repository_info", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
