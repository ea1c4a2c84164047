//! Repository and storage configuration.
//!
//! Loaded once at startup (optionally overlaid with entries from the remote
//! configuration service), validated, then shared read-only.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, InvalidInputError};
use crate::storage::BackendKind;

/// The repository's deleted-record policy as advertised by Identify.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletedRecords {
    #[default]
    No,
    Transient,
    Persistent,
}

impl DeletedRecords {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletedRecords::No => "no",
            DeletedRecords::Transient => "transient",
            DeletedRecords::Persistent => "persistent",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "no" => Some(DeletedRecords::No),
            "transient" => Some(DeletedRecords::Transient),
            "persistent" => Some(DeletedRecords::Persistent),
            _ => None,
        }
    }
}

/// Settings describing the repository to harvesters.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Base URL harvesters use; echoed in every response.
    pub base_url: String,
    /// Page size for list verbs.
    #[serde(default = "default_max_records")]
    pub max_records_per_response: u64,
    /// Repository identifier used in protocol identifiers. Defaults to the
    /// host of `base_url`.
    #[serde(default)]
    pub identifier_namespace: Option<String>,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    #[serde(default = "default_granularity")]
    pub granularity: String,
    #[serde(default)]
    pub deleted_records: DeletedRecords,
    #[serde(default)]
    pub admin_emails: Vec<String>,
    #[serde(default = "default_compressions")]
    pub compressions: Vec<String>,
    /// Exclude records suppressed from discovery.
    #[serde(default)]
    pub skip_suppressed: bool,
    /// Tenant used when a request carries no tenant header.
    #[serde(default)]
    pub default_tenant: Option<String>,
}

fn default_max_records() -> u64 {
    100
}
fn default_name() -> String {
    "oaigate".to_string()
}
fn default_protocol_version() -> String {
    "2.0".to_string()
}
fn default_granularity() -> String {
    "YYYY-MM-DDThh:mm:ssZ".to_string()
}
fn default_compressions() -> Vec<String> {
    vec!["gzip".to_string(), "deflate".to_string()]
}

fn config_error(field: &str, reason: impl Into<String>) -> Error {
    InvalidInputError::Config {
        field: field.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl RepositoryConfig {
    /// A configuration with defaults for everything but the base URL and
    /// admin contact.
    pub fn new(base_url: impl Into<String>, admin_email: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_records_per_response: default_max_records(),
            identifier_namespace: None,
            name: default_name(),
            protocol_version: default_protocol_version(),
            granularity: default_granularity(),
            deleted_records: DeletedRecords::default(),
            admin_emails: vec![admin_email.into()],
            compressions: default_compressions(),
            skip_suppressed: false,
            default_tenant: None,
        }
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_records_per_response == 0 {
            return Err(config_error(
                "max_records_per_response",
                "must be greater than zero",
            ));
        }
        Url::parse(&self.base_url).map_err(|e| config_error("base_url", e.to_string()))?;
        if self.admin_emails.iter().all(|e| e.trim().is_empty()) {
            return Err(config_error("admin_emails", "at least one is required"));
        }
        if self.namespace().is_empty() {
            return Err(config_error(
                "identifier_namespace",
                "cannot be derived from base_url",
            ));
        }
        Ok(())
    }

    /// The repository identifier for protocol identifiers.
    pub fn namespace(&self) -> String {
        if let Some(ref ns) = self.identifier_namespace {
            return ns.clone();
        }
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// Overlay `(code, value)` entries from the remote configuration service.
    ///
    /// Unknown codes are skipped; values that do not parse leave the current
    /// setting untouched.
    pub fn merge_entries<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (code, value) in entries {
            match code {
                "repository.name" => self.name = value.to_string(),
                "repository.baseURL" => self.base_url = value.to_string(),
                "repository.protocolVersion" => self.protocol_version = value.to_string(),
                "repository.timeGranularity" => self.granularity = value.to_string(),
                "repository.adminEmails" => {
                    self.admin_emails = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "repository.maxRecordsPerResponse" => match value.trim().parse() {
                    Ok(n) => self.max_records_per_response = n,
                    Err(_) => warn!(code, value, "ignoring non-numeric configuration entry"),
                },
                "repository.deletedRecords" => match DeletedRecords::parse(value.trim()) {
                    Some(policy) => self.deleted_records = policy,
                    None => warn!(code, value, "ignoring unknown deleted-record policy"),
                },
                other => {
                    debug!(code = other, "skipping unrelated configuration entry");
                    continue;
                }
            }
            debug!(code, "applied remote configuration entry");
        }
    }
}

/// Connection settings for the storage backend.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Backend base URL used when a request carries no URL header.
    #[serde(default)]
    pub url: Option<String>,
    /// Per-call timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout_secs == 0 {
            return Err(config_error("timeout_secs", "must be greater than zero"));
        }
        if let Some(ref url) = self.url {
            Url::parse(url).map_err(|e| config_error("url", e.to_string()))?;
        }
        Ok(())
    }
}
