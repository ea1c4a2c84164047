//! Configuration file loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use oaigate_core::{RepositoryConfig, StorageConfig};

/// Top-level configuration, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Where to read repository overrides from, if anywhere.
    #[serde(default)]
    pub remote_config: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8081".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// The configuration service and the tenant to read entries for.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub tenant: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Parse configuration from TOML text and check it.
pub fn parse_config(content: &str) -> Result<GatewayConfig> {
    let config: GatewayConfig =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config
        .repository
        .validate()
        .context("Invalid [repository] section")?;
    config
        .storage
        .validate()
        .context("Invalid [storage] section")?;
    Ok(config)
}

/// Read and parse the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<GatewayConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oaigate_core::{BackendKind, DeletedRecords};
    use std::io::Write;

    const MINIMAL: &str = r#"
[repository]
base_url = "https://library.example/oai"
admin_emails = ["oai@library.example"]
"#;

    #[test]
    fn minimal_file_gets_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8081");
        assert_eq!(config.repository.max_records_per_response, 100);
        assert_eq!(config.storage.backend, BackendKind::Instances);
        assert_eq!(config.storage.timeout_secs, 30);
        assert!(config.remote_config.is_none());
    }

    #[test]
    fn full_file() {
        let content = r#"
[server]
bind = "0.0.0.0:9000"

[repository]
base_url = "https://library.example/oai"
admin_emails = ["oai@library.example"]
max_records_per_response = 50
deleted_records = "persistent"
default_tenant = "diku"

[storage]
backend = "source-records"
url = "http://okapi:9130"
timeout_secs = 5

[remote_config]
url = "http://okapi:9130"
tenant = "diku"
"#;
        let config = parse_config(content).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.repository.max_records_per_response, 50);
        assert_eq!(config.repository.deleted_records, DeletedRecords::Persistent);
        assert_eq!(config.storage.backend, BackendKind::SourceRecords);
        let remote = config.remote_config.unwrap();
        assert_eq!(remote.tenant, "diku");
        assert!(remote.token.is_none());
    }

    #[test]
    fn rejects_zero_page_size() {
        let content = format!("{}max_records_per_response = 0\n", MINIMAL);
        let err = parse_config(&content).unwrap_err();
        assert!(format!("{:#}", err).contains("max_records_per_response"));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.repository.base_url, "https://library.example/oai");
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_config(Path::new("/nonexistent/oaigate.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/oaigate.toml"));
    }
}
