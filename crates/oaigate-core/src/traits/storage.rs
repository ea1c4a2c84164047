//! Storage transport trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Read access to a storage backend for one tenant.
///
/// Implementations issue a GET for an endpoint path (with query string)
/// relative to the backend base URL and decode the JSON body.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch `endpoint`.
    ///
    /// Returns `Ok(None)` when the backend answers 404. Any other
    /// non-success status, a timeout or an undecodable body is an error.
    async fn get_json(&self, endpoint: &str) -> Result<Option<Value>>;
}
