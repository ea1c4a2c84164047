//! oaigate-server - HTTP front end for the oaigate engine.
//!
//! Each OAI-PMH verb is served on its own path. Requests name their tenant
//! and storage backend through the `X-Okapi-*` headers; the configured
//! default tenant and storage URL fill in when they are absent.

pub mod cli;
pub mod config;
mod output;
pub mod routes;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use oaigate::Gateway;
use oaigate_http::{StorageClientFactory, merge_remote_config};

use config::GatewayConfig;
use routes::AppState;

/// Build the shared state, merging remote repository settings first.
pub async fn build_state(mut config: GatewayConfig) -> Result<AppState> {
    let factory = StorageClientFactory::new(Duration::from_secs(config.storage.timeout_secs))
        .context("Failed to create storage client")?;

    if let Some(remote) = &config.remote_config {
        let storage = factory
            .for_tenant(&remote.tenant, &remote.url, remote.token.as_deref())
            .context("Invalid [remote_config] section")?;
        merge_remote_config(&mut config.repository, &storage).await;
    }

    let gateway = Gateway::new(config.repository, config.storage.backend)
        .context("Invalid repository configuration")?;

    Ok(AppState {
        gateway,
        factory,
        storage_url: config.storage.url,
    })
}

/// Serve until the process is stopped.
pub async fn serve(config: GatewayConfig) -> Result<()> {
    let bind = config.server.bind.clone();
    let state = build_state(config).await?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(%bind, "OAI-PMH gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}
