//! Routes: one path per verb.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use tracing::{debug, error};

use oaigate::Gateway;
use oaigate_core::{Request, RequestParams, Verb};
use oaigate_http::StorageClientFactory;
use oaigate_http::endpoints::{TENANT_HEADER, TOKEN_HEADER, URL_HEADER};

use crate::output;

/// Shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub factory: StorageClientFactory,
    /// Backend used when a request carries no `X-Okapi-Url`.
    pub storage_url: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/records", get(list_records))
        .route("/records/{identifier}", get(get_record))
        .route("/identifiers", get(list_identifiers))
        .route("/metadata_formats", get(list_metadata_formats))
        .route("/sets", get(list_sets))
        .route("/repository_info", get(identify))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

impl AppState {
    async fn dispatch(&self, verb: Verb, headers: &HeaderMap, params: RequestParams) -> Response {
        let tenant = match header(headers, TENANT_HEADER)
            .map(str::to_string)
            .or_else(|| self.gateway.config().default_tenant.clone())
        {
            Some(tenant) => tenant,
            None => return output::bad_request("Missing X-Okapi-Tenant header"),
        };

        let Some(url) = header(headers, URL_HEADER).or(self.storage_url.as_deref()) else {
            error!(%tenant, "no storage URL in request or configuration");
            return output::internal_error();
        };

        let storage = match self
            .factory
            .for_tenant(&tenant, url, header(headers, TOKEN_HEADER))
        {
            Ok(storage) => storage,
            Err(err) => {
                error!(error = %err, "cannot reach storage");
                return output::internal_error();
            }
        };

        debug!(%verb, %tenant, "dispatching");
        let request = Request::builder(verb, self.gateway.tenant_context(tenant))
            .params(params)
            .build();
        match self.gateway.handle(&storage, request).await {
            Ok(response) => output::xml(response),
            Err(_) => output::internal_error(),
        }
    }
}

async fn list_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RequestParams>,
) -> Response {
    state.dispatch(Verb::ListRecords, &headers, params).await
}

async fn list_identifiers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RequestParams>,
) -> Response {
    state.dispatch(Verb::ListIdentifiers, &headers, params).await
}

async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
    Query(mut params): Query<RequestParams>,
) -> Response {
    params.identifier = Some(identifier);
    state.dispatch(Verb::GetRecord, &headers, params).await
}

async fn list_metadata_formats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RequestParams>,
) -> Response {
    state.dispatch(Verb::ListMetadataFormats, &headers, params).await
}

async fn list_sets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RequestParams>,
) -> Response {
    state.dispatch(Verb::ListSets, &headers, params).await
}

async fn identify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RequestParams>,
) -> Response {
    state.dispatch(Verb::Identify, &headers, params).await
}

async fn health() -> &'static str {
    "OK"
}
