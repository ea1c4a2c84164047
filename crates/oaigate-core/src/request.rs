//! The harvesting request model.
//!
//! A [`Request`] is built once per incoming call through [`RequestBuilder`]
//! and never mutated afterwards. Continuing a harvest from a resumption token
//! builds a fresh request (see [`Request::restore`]).

use serde::Deserialize;

use crate::token::ResumptionToken;
use crate::types::Verb;

/// Tenant identity needed to compute protocol identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantContext {
    tenant: String,
    namespace: String,
}

impl TenantContext {
    /// `namespace` is the repository identifier, usually the host of the base URL.
    pub fn new(tenant: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            namespace: namespace.into(),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `oai:{namespace}:{tenant}/`, prepended to every storage id.
    pub fn identifier_prefix(&self) -> String {
        format!("oai:{}:{}/", self.namespace, self.tenant)
    }
}

/// Raw harvesting arguments as they arrive on the query string.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    pub metadata_prefix: Option<String>,
    pub identifier: Option<String>,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
    pub resumption_token: Option<String>,
}

/// One harvesting request plus its pagination state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    verb: Verb,
    metadata_prefix: Option<String>,
    identifier: Option<String>,
    from: Option<String>,
    until: Option<String>,
    set: Option<String>,
    resumption_token: Option<String>,
    offset: u64,
    total_records: Option<u64>,
    next_record_id: Option<String>,
    restored: bool,
    tenant: TenantContext,
}

impl Request {
    /// Start building a request for `verb` on behalf of `tenant`.
    pub fn builder(verb: Verb, tenant: TenantContext) -> RequestBuilder {
        RequestBuilder {
            request: Request {
                verb,
                metadata_prefix: None,
                identifier: None,
                from: None,
                until: None,
                set: None,
                resumption_token: None,
                offset: 0,
                total_records: None,
                next_record_id: None,
                restored: false,
                tenant,
            },
        }
    }

    /// Rebuild the harvest described by a decoded token.
    ///
    /// The returned request keeps the raw token string so it can be echoed,
    /// and is flagged as restored.
    pub fn restore(&self, token: &ResumptionToken) -> Request {
        Request {
            verb: self.verb,
            metadata_prefix: Some(token.metadata_prefix.clone()),
            identifier: None,
            from: token.from.clone(),
            until: token.until.clone(),
            set: token.set.clone(),
            resumption_token: self.resumption_token.clone(),
            offset: token.offset,
            total_records: Some(token.total_records),
            next_record_id: Some(token.next_record_id.clone()),
            restored: true,
            tenant: self.tenant.clone(),
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn metadata_prefix(&self) -> Option<&str> {
        self.metadata_prefix.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn until(&self) -> Option<&str> {
        self.until.as_deref()
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn resumption_token(&self) -> Option<&str> {
        self.resumption_token.as_deref()
    }

    /// Position of the first item of this page in the full result set.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Total reported by the backend when the token was issued.
    pub fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    /// Id of the last item of the previous page.
    pub fn next_record_id(&self) -> Option<&str> {
        self.next_record_id.as_deref()
    }

    /// True when this request was rebuilt from a resumption token.
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    pub fn identifier_prefix(&self) -> String {
        self.tenant.identifier_prefix()
    }

    /// True if any argument that a resumption token replaces is present.
    pub fn has_harvest_arguments(&self) -> bool {
        self.metadata_prefix.is_some()
            || self.from.is_some()
            || self.until.is_some()
            || self.set.is_some()
    }

    /// True when the identifier is this tenant's prefix followed by a storage id.
    pub fn has_valid_identifier(&self) -> bool {
        self.storage_identifier().is_some()
    }

    /// The storage id behind the protocol identifier, if the identifier is valid.
    pub fn storage_identifier(&self) -> Option<&str> {
        let prefix = self.identifier_prefix();
        self.identifier
            .as_deref()
            .and_then(|id| id.strip_prefix(prefix.as_str()))
            .filter(|id| !id.is_empty())
    }
}

/// Builder for [`Request`].
///
/// Empty strings are treated as absent arguments.
#[derive(Debug)]
pub struct RequestBuilder {
    request: Request,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() { None } else { Some(value) }
}

impl RequestBuilder {
    pub fn metadata_prefix(mut self, value: impl Into<String>) -> Self {
        self.request.metadata_prefix = non_empty(value);
        self
    }

    pub fn identifier(mut self, value: impl Into<String>) -> Self {
        self.request.identifier = non_empty(value);
        self
    }

    pub fn from(mut self, value: impl Into<String>) -> Self {
        self.request.from = non_empty(value);
        self
    }

    pub fn until(mut self, value: impl Into<String>) -> Self {
        self.request.until = non_empty(value);
        self
    }

    pub fn set(mut self, value: impl Into<String>) -> Self {
        self.request.set = non_empty(value);
        self
    }

    pub fn resumption_token(mut self, value: impl Into<String>) -> Self {
        self.request.resumption_token = non_empty(value);
        self
    }

    /// Apply every argument present in `params`.
    pub fn params(self, params: RequestParams) -> Self {
        let RequestParams {
            metadata_prefix,
            identifier,
            from,
            until,
            set,
            resumption_token,
        } = params;

        let mut builder = self;
        if let Some(v) = metadata_prefix {
            builder = builder.metadata_prefix(v);
        }
        if let Some(v) = identifier {
            builder = builder.identifier(v);
        }
        if let Some(v) = from {
            builder = builder.from(v);
        }
        if let Some(v) = until {
            builder = builder.until(v);
        }
        if let Some(v) = set {
            builder = builder.set(v);
        }
        if let Some(v) = resumption_token {
            builder = builder.resumption_token(v);
        }
        builder
    }

    pub fn build(self) -> Request {
        self.request
    }
}
