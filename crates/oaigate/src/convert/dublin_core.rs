//! MARC-JSON to simple Dublin Core (`oai_dc`).

use serde_json::Value;

use oaigate_core::error::ConvertError;
use oaigate_core::{MetadataConverter, MetadataFormat};

use super::marc::MarcRecord;
use crate::xml::XmlBuilder;

pub const OAI_DC_PREFIX: &str = "oai_dc";
const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
const OAI_DC_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai_dc.xsd";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Produces `oai_dc` records from MARC.
#[derive(Debug, Clone)]
pub struct DublinCoreConverter {
    format: MetadataFormat,
}

impl DublinCoreConverter {
    pub fn new() -> Self {
        Self {
            format: MetadataFormat::new(OAI_DC_PREFIX, OAI_DC_SCHEMA, OAI_DC_NAMESPACE),
        }
    }
}

impl Default for DublinCoreConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip ISBD punctuation left at the end of MARC subfields.
fn clean(value: &str) -> String {
    value
        .trim()
        .trim_end_matches([' ', '/', ':', ';', ',', '.', '='])
        .trim()
        .to_string()
}

fn title(record: &MarcRecord) -> Option<String> {
    let field = record.fields_with_tag("245").next()?;
    let parts: Vec<String> = field
        .subfield_values("a")
        .chain(field.subfield_values("b"))
        .map(clean)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" : "))
    }
}

/// DCMI type vocabulary for leader position 6.
fn dc_type(leader: &str) -> Option<&'static str> {
    match leader.as_bytes().get(6)? {
        b'a' | b't' | b'c' | b'd' => Some("Text"),
        b'e' | b'f' | b'g' | b'k' => Some("Image"),
        b'i' | b'j' => Some("Sound"),
        b'm' => Some("Software"),
        b'o' | b'p' => Some("Collection"),
        b'r' => Some("PhysicalObject"),
        _ => None,
    }
}

fn values(record: &MarcRecord, pairs: &[(&str, &str)]) -> Vec<String> {
    pairs
        .iter()
        .flat_map(|(tag, code)| record.subfield_values(tag, code))
        .map(clean)
        .filter(|s| !s.is_empty())
        .collect()
}

impl MetadataConverter for DublinCoreConverter {
    fn format(&self) -> &MetadataFormat {
        &self.format
    }

    fn convert(&self, payload: &Value) -> Result<String, ConvertError> {
        let record = MarcRecord::from_json(payload)?;

        let mut elements: Vec<(&str, String)> = Vec::new();
        if let Some(title) = title(&record) {
            elements.push(("dc:title", title));
        }
        for creator in values(&record, &[("100", "a"), ("110", "a"), ("700", "a")]) {
            elements.push(("dc:creator", creator));
        }
        for subject in values(&record, &[("650", "a")]) {
            elements.push(("dc:subject", subject));
        }
        for description in values(&record, &[("520", "a")]) {
            elements.push(("dc:description", description));
        }
        for publisher in values(&record, &[("260", "b"), ("264", "b")]) {
            elements.push(("dc:publisher", publisher));
        }
        for date in values(&record, &[("260", "c"), ("264", "c")]) {
            elements.push(("dc:date", date));
        }
        if let Some(kind) = dc_type(&record.leader) {
            elements.push(("dc:type", kind.to_string()));
        }
        for identifier in values(&record, &[("020", "a"), ("022", "a")]) {
            elements.push(("dc:identifier", identifier));
        }
        for language in values(&record, &[("041", "a")]) {
            elements.push(("dc:language", language));
        }

        let schema_location = format!("{} {}", OAI_DC_NAMESPACE, OAI_DC_SCHEMA);
        let mut xml = XmlBuilder::new();
        xml.start(
            "oai_dc:dc",
            &[
                ("xmlns:oai_dc", OAI_DC_NAMESPACE),
                ("xmlns:dc", DC_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", schema_location.as_str()),
            ],
        )?;
        for (name, value) in &elements {
            xml.element(name, &[], value)?;
        }
        xml.end("oai_dc:dc")?;
        Ok(xml.finish()?)
    }
}
