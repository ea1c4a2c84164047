//! MARC-JSON to MARCXML.

use serde_json::Value;

use oaigate_core::error::ConvertError;
use oaigate_core::{MetadataConverter, MetadataFormat};

use super::marc::{Field, MarcRecord};
use crate::xml::XmlBuilder;

pub const MARC21_PREFIX: &str = "marc21";
const MARC21_NAMESPACE: &str = "http://www.loc.gov/MARC21/slim";
const MARC21_SCHEMA: &str = "http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd";

/// Produces `marc21` records in the MARC21 slim schema.
#[derive(Debug, Clone)]
pub struct Marc21Converter {
    format: MetadataFormat,
}

impl Marc21Converter {
    pub fn new() -> Self {
        Self {
            format: MetadataFormat::new(MARC21_PREFIX, MARC21_SCHEMA, MARC21_NAMESPACE),
        }
    }
}

impl Default for Marc21Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataConverter for Marc21Converter {
    fn format(&self) -> &MetadataFormat {
        &self.format
    }

    fn convert(&self, payload: &Value) -> Result<String, ConvertError> {
        let record = MarcRecord::from_json(payload)?;
        let mut xml = XmlBuilder::new();
        xml.start("record", &[("xmlns", MARC21_NAMESPACE)])?;
        xml.element("leader", &[], &record.leader)?;
        for field in &record.fields {
            match field {
                Field::Control { tag, value } => {
                    xml.element("controlfield", &[("tag", tag.as_str())], value)?;
                }
                Field::Data {
                    tag,
                    ind1,
                    ind2,
                    subfields,
                } => {
                    xml.start(
                        "datafield",
                        &[("tag", tag.as_str()), ("ind1", ind1.as_str()), ("ind2", ind2.as_str())],
                    )?;
                    for (code, value) in subfields {
                        xml.element("subfield", &[("code", code.as_str())], value)?;
                    }
                    xml.end("datafield")?;
                }
            }
        }
        xml.end("record")?;
        Ok(xml.finish()?)
    }
}
