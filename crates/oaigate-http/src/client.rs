//! reqwest-backed storage transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;

use oaigate_core::error::{BackendError, Error, InvalidInputError, TransportError};
use oaigate_core::{Result, Storage};

use crate::endpoints::{TENANT_HEADER, TOKEN_HEADER, URL_HEADER};

/// Shared HTTP client handing out tenant-scoped [`HttpStorage`] handles.
///
/// The underlying connection pool lives as long as the factory; handles are
/// cheap and meant to be created per incoming request.
#[derive(Debug, Clone)]
pub struct StorageClientFactory {
    client: reqwest::Client,
    timeout: Duration,
}

impl StorageClientFactory {
    /// Create a factory whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oaigate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| transport_error(e, timeout))?;
        Ok(Self { client, timeout })
    }

    /// A handle calling `base_url` on behalf of `tenant`.
    pub fn for_tenant(
        &self,
        tenant: &str,
        base_url: &str,
        token: Option<&str>,
    ) -> Result<HttpStorage> {
        let base = Url::parse(base_url).map_err(|e| {
            Error::from(InvalidInputError::Other {
                message: format!("invalid storage URL '{}': {}", base_url, e),
            })
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(TENANT_HEADER), header_value(tenant)?);
        headers.insert(HeaderName::from_static(URL_HEADER), header_value(base_url)?);
        if let Some(token) = token {
            headers.insert(HeaderName::from_static(TOKEN_HEADER), header_value(token)?);
        }

        Ok(HttpStorage {
            client: self.client.clone(),
            base: base.as_str().trim_end_matches('/').to_string(),
            tenant: tenant.to_string(),
            headers,
            timeout: self.timeout,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        InvalidInputError::Other {
            message: format!("'{}' is not a valid header value", value),
        }
        .into()
    })
}

/// Map a reqwest failure onto the transport error taxonomy. A timeout reports
/// the `timeout` the call ran under.
fn transport_error(err: reqwest::Error, timeout: Duration) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// A storage backend reached over HTTP for one tenant.
#[derive(Debug, Clone)]
pub struct HttpStorage {
    client: reqwest::Client,
    base: String,
    tenant: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl HttpStorage {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base, endpoint)
        } else {
            format!("{}/{}", self.base, endpoint)
        }
    }
}

#[async_trait]
impl Storage for HttpStorage {
    #[instrument(skip(self), fields(tenant = %self.tenant))]
    async fn get_json(&self, endpoint: &str) -> Result<Option<Value>> {
        let url = self.url(endpoint);
        debug!(%url, "storage request");

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        trace!(status = %status, "storage response");

        if status == StatusCode::NOT_FOUND {
            debug!(endpoint, "storage returned 404");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(BackendError::new(status.as_u16(), endpoint, body).into());
        }

        let body = response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                Error::payload(format!("{} returned invalid JSON: {}", endpoint, e))
            } else {
                transport_error(e, self.timeout)
            }
        })?;
        Ok(Some(body))
    }
}
