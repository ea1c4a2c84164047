//! Backend header names and configuration service types.

use serde::Deserialize;

/// Tenant the backend call is made for.
pub const TENANT_HEADER: &str = "x-okapi-tenant";
/// Base URL of the backend gateway.
pub const URL_HEADER: &str = "x-okapi-url";
/// Access token forwarded to the backend.
pub const TOKEN_HEADER: &str = "x-okapi-token";

/// Configuration entries owned by this module.
pub const CONFIGURATION_ENTRIES: &str =
    "/configurations/entries?query=module%3D%3DOAI-PMH&limit=100";

/// Response of the configuration entries endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEntries {
    #[serde(default)]
    pub configs: Vec<ConfigEntry>,
    #[serde(rename = "totalRecords", default)]
    pub total_records: Option<u64>,
}

/// A single `code = value` configuration entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEntry {
    pub code: String,
    #[serde(default)]
    pub value: String,
}
