//! Core OAI-PMH types.
//!
//! These types enforce protocol invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod datestamp;
mod oai_error;
mod verb;

pub use datestamp::Datestamp;
pub use oai_error::{ErrorCode, OaiError};
pub use verb::Verb;

/// A metadata format the repository can disseminate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataFormat {
    /// The `metadataPrefix` harvesters use to request the format.
    pub prefix: String,
    /// Location of the XML schema for the format.
    pub schema: String,
    /// XML namespace of the format's root element.
    pub namespace: String,
}

impl MetadataFormat {
    pub fn new(
        prefix: impl Into<String>,
        schema: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            schema: schema.into(),
            namespace: namespace.into(),
        }
    }
}

/// A set the repository exposes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetSpec {
    pub spec: String,
    pub name: String,
}

impl SetSpec {
    /// The single flat set every record belongs to.
    pub fn all() -> Self {
        Self {
            spec: "all".to_string(),
            name: "All records".to_string(),
        }
    }
}
