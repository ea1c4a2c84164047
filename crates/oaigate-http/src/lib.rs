//! oaigate-http - HTTP transport for oaigate.
//!
//! Provides [`HttpStorage`], the reqwest-backed implementation of
//! [`oaigate_core::Storage`], the tenant-aware [`StorageClientFactory`] that
//! hands out per-request handles over one pooled client, and the client for
//! the remote configuration service.

mod client;
pub mod endpoints;
pub mod remote_config;

pub use client::{HttpStorage, StorageClientFactory};
pub use remote_config::{fetch_entries, merge_remote_config};
