//! Metadata converter trait.

use serde_json::Value;

use crate::error::ConvertError;
use crate::types::MetadataFormat;

/// Turns a backend record payload into one metadata format.
pub trait MetadataConverter: Send + Sync {
    /// The format this converter produces.
    fn format(&self) -> &MetadataFormat;

    /// Convert `payload` into a serialised XML fragment.
    fn convert(&self, payload: &Value) -> Result<String, ConvertError>;
}
