//! Metadata converters and their registry.

mod dublin_core;
mod marc;
mod marcxml;

pub use dublin_core::{DublinCoreConverter, OAI_DC_PREFIX};
pub use marc::{Field, MarcRecord};
pub use marcxml::{MARC21_PREFIX, Marc21Converter};

use oaigate_core::error::ConvertError;
use oaigate_core::{MetadataConverter, MetadataFormat};

/// Converters keyed by metadata prefix, in registration order.
pub struct ConverterRegistry {
    converters: Vec<Box<dyn MetadataConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    /// `oai_dc` and `marc21`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DublinCoreConverter::new());
        registry.register(Marc21Converter::new());
        registry
    }

    /// Add a converter, replacing any registered under the same prefix.
    pub fn register(&mut self, converter: impl MetadataConverter + 'static) {
        let prefix = converter.format().prefix.clone();
        self.converters.retain(|c| c.format().prefix != prefix);
        self.converters.push(Box::new(converter));
    }

    pub fn get(&self, prefix: &str) -> Option<&dyn MetadataConverter> {
        self.converters
            .iter()
            .find(|c| c.format().prefix == prefix)
            .map(|c| c.as_ref())
    }

    pub fn prefixes(&self) -> Vec<String> {
        self.converters
            .iter()
            .map(|c| c.format().prefix.clone())
            .collect()
    }

    pub fn formats(&self) -> Vec<MetadataFormat> {
        self.converters.iter().map(|c| c.format().clone()).collect()
    }

    /// Like [`get`](Self::get), but an unknown prefix is an error.
    pub fn require(&self, prefix: &str) -> Result<&dyn MetadataConverter, ConvertError> {
        self.get(prefix).ok_or_else(|| ConvertError::UnsupportedFormat {
            prefix: prefix.to_string(),
        })
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("prefixes", &self.prefixes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_in_order() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.prefixes(), vec!["oai_dc", "marc21"]);
        assert_eq!(
            registry.formats()[1].namespace,
            "http://www.loc.gov/MARC21/slim"
        );
    }

    #[test]
    fn unknown_prefix_is_unsupported() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.require("marc21").unwrap().format().prefix, "marc21");
        let Err(err) = registry.require("mods") else {
            panic!("mods should not be registered");
        };
        assert!(matches!(err, ConvertError::UnsupportedFormat { prefix } if prefix == "mods"));
    }

    #[test]
    fn register_replaces_same_prefix() {
        let mut registry = ConverterRegistry::with_defaults();
        registry.register(Marc21Converter::new());
        assert_eq!(registry.prefixes(), vec!["oai_dc", "marc21"]);
    }
}
