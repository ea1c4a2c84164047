//! Remote configuration service client.
//!
//! Repository settings may be overridden by entries stored in the
//! configuration module under `module==OAI-PMH`. They are read once at
//! startup and merged over the file configuration.

use tracing::{error, info, instrument};

use oaigate_core::{Error, RepositoryConfig, Result, Storage};

use crate::endpoints::{CONFIGURATION_ENTRIES, ConfigEntries, ConfigEntry};

/// Fetch this module's configuration entries. A 404 yields no entries.
#[instrument(skip(storage))]
pub async fn fetch_entries(storage: &dyn Storage) -> Result<Vec<ConfigEntry>> {
    let Some(body) = storage.get_json(CONFIGURATION_ENTRIES).await? else {
        return Ok(Vec::new());
    };
    let entries: ConfigEntries = serde_json::from_value(body)
        .map_err(|e| Error::payload(format!("invalid configuration entries: {}", e)))?;
    Ok(entries.configs)
}

/// Merge remote entries into `config`.
///
/// A failing configuration service is logged and otherwise ignored; the file
/// configuration stays in effect. Returns the number of entries received.
pub async fn merge_remote_config(config: &mut RepositoryConfig, storage: &dyn Storage) -> usize {
    match fetch_entries(storage).await {
        Ok(entries) => {
            info!(count = entries.len(), "loaded remote configuration");
            config.merge_entries(entries.iter().map(|e| (e.code.as_str(), e.value.as_str())));
            entries.len()
        }
        Err(e) => {
            error!(error = %e, "failed to load remote configuration, using local settings");
            0
        }
    }
}
