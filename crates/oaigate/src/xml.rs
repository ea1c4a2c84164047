//! XML output: a small element writer and the `OAI-PMH` envelope.

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use oaigate_core::error::ConvertError;
use oaigate_core::{Error, Header, Identify, OaiPmh, Record, RequestEcho, ResponseBody};
use oaigate_core::{MetadataFormat, OaiError, ResumptionTokenInfo, SetSpec};

const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const OAI_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";

/// Failure while writing XML.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct XmlError(String);

impl From<XmlError> for Error {
    fn from(err: XmlError) -> Self {
        Error::Xml { message: err.0 }
    }
}

impl From<XmlError> for ConvertError {
    fn from(err: XmlError) -> Self {
        ConvertError::Encoding { message: err.0 }
    }
}

/// Thin wrapper over a quick-xml writer with element-level helpers.
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.writer
            .write_event(event)
            .map_err(|e| XmlError(e.to_string()))
    }

    pub fn declaration(&mut self) -> Result<(), XmlError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), XmlError> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write(Event::Start(element))
    }

    pub fn end(&mut self, name: &str) -> Result<(), XmlError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Character data with markup characters escaped.
    pub fn text(&mut self, text: &str) -> Result<(), XmlError> {
        self.write(Event::Text(BytesText::from_escaped(partial_escape(text))))
    }

    /// An already serialised fragment, written verbatim.
    pub fn raw(&mut self, fragment: &str) -> Result<(), XmlError> {
        self.write(Event::Text(BytesText::from_escaped(fragment)))
    }

    /// `<name attrs...>text</name>`.
    pub fn element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), XmlError> {
        self.start(name, attributes)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Result<String, XmlError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| XmlError(e.to_string()))
    }
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialise a complete response document.
pub fn write_document(doc: &OaiPmh) -> Result<String, Error> {
    let mut xml = XmlBuilder::new();
    xml.declaration()?;
    xml.start(
        "OAI-PMH",
        &[
            ("xmlns", OAI_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", OAI_SCHEMA_LOCATION),
        ],
    )?;
    xml.element("responseDate", &[], &doc.response_date.to_string())?;
    write_request(&mut xml, &doc.request)?;

    match &doc.body {
        ResponseBody::Errors(errors) => write_errors(&mut xml, errors)?,
        ResponseBody::Identify(identify) => write_identify(&mut xml, identify)?,
        ResponseBody::ListMetadataFormats(formats) => write_formats(&mut xml, formats)?,
        ResponseBody::ListSets(sets) => write_sets(&mut xml, sets)?,
        ResponseBody::ListIdentifiers {
            headers,
            resumption_token,
        } => {
            xml.start("ListIdentifiers", &[])?;
            for header in headers {
                write_header(&mut xml, header)?;
            }
            write_resumption_token(&mut xml, resumption_token.as_ref())?;
            xml.end("ListIdentifiers")?;
        }
        ResponseBody::ListRecords {
            records,
            resumption_token,
        } => {
            xml.start("ListRecords", &[])?;
            for record in records {
                write_record(&mut xml, record)?;
            }
            write_resumption_token(&mut xml, resumption_token.as_ref())?;
            xml.end("ListRecords")?;
        }
        ResponseBody::GetRecord(record) => {
            xml.start("GetRecord", &[])?;
            write_record(&mut xml, record)?;
            xml.end("GetRecord")?;
        }
    }

    xml.end("OAI-PMH")?;
    Ok(xml.finish()?)
}

fn write_request(xml: &mut XmlBuilder, echo: &RequestEcho) -> Result<(), XmlError> {
    let verb = echo.verb.map(|v| v.as_str());
    let attributes: Vec<(&str, &str)> = [
        ("verb", verb),
        ("identifier", echo.identifier.as_deref()),
        ("metadataPrefix", echo.metadata_prefix.as_deref()),
        ("from", echo.from.as_deref()),
        ("until", echo.until.as_deref()),
        ("set", echo.set.as_deref()),
        ("resumptionToken", echo.resumption_token.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| (name, v)))
    .collect();
    xml.element("request", &attributes, &echo.base_url)
}

fn write_errors(xml: &mut XmlBuilder, errors: &[OaiError]) -> Result<(), XmlError> {
    for error in errors {
        xml.element("error", &[("code", error.code.as_str())], &error.message)?;
    }
    Ok(())
}

fn write_identify(xml: &mut XmlBuilder, identify: &Identify) -> Result<(), XmlError> {
    xml.start("Identify", &[])?;
    xml.element("repositoryName", &[], &identify.repository_name)?;
    xml.element("baseURL", &[], &identify.base_url)?;
    xml.element("protocolVersion", &[], &identify.protocol_version)?;
    for email in &identify.admin_emails {
        xml.element("adminEmail", &[], email)?;
    }
    xml.element(
        "earliestDatestamp",
        &[],
        &identify.earliest_datestamp.to_string(),
    )?;
    xml.element("deletedRecord", &[], identify.deleted_record.as_str())?;
    xml.element("granularity", &[], &identify.granularity)?;
    for compression in &identify.compressions {
        xml.element("compression", &[], compression)?;
    }
    xml.end("Identify")
}

fn write_formats(xml: &mut XmlBuilder, formats: &[MetadataFormat]) -> Result<(), XmlError> {
    xml.start("ListMetadataFormats", &[])?;
    for format in formats {
        xml.start("metadataFormat", &[])?;
        xml.element("metadataPrefix", &[], &format.prefix)?;
        xml.element("schema", &[], &format.schema)?;
        xml.element("metadataNamespace", &[], &format.namespace)?;
        xml.end("metadataFormat")?;
    }
    xml.end("ListMetadataFormats")
}

fn write_sets(xml: &mut XmlBuilder, sets: &[SetSpec]) -> Result<(), XmlError> {
    xml.start("ListSets", &[])?;
    for set in sets {
        xml.start("set", &[])?;
        xml.element("setSpec", &[], &set.spec)?;
        xml.element("setName", &[], &set.name)?;
        xml.end("set")?;
    }
    xml.end("ListSets")
}

fn write_header(xml: &mut XmlBuilder, header: &Header) -> Result<(), XmlError> {
    xml.start("header", &[])?;
    xml.element("identifier", &[], &header.identifier)?;
    xml.element("datestamp", &[], &header.datestamp.to_string())?;
    for spec in &header.set_specs {
        xml.element("setSpec", &[], spec)?;
    }
    xml.end("header")
}

fn write_record(xml: &mut XmlBuilder, record: &Record) -> Result<(), XmlError> {
    xml.start("record", &[])?;
    write_header(xml, &record.header)?;
    xml.start("metadata", &[])?;
    xml.raw(&record.metadata)?;
    xml.end("metadata")?;
    xml.end("record")
}

fn write_resumption_token(
    xml: &mut XmlBuilder,
    token: Option<&ResumptionTokenInfo>,
) -> Result<(), XmlError> {
    let Some(token) = token else {
        return Ok(());
    };
    let size = token.complete_list_size.to_string();
    let cursor = token.cursor.to_string();
    xml.element(
        "resumptionToken",
        &[("completeListSize", size.as_str()), ("cursor", cursor.as_str())],
        &token.value,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use oaigate_core::{Datestamp, DeletedRecords, StorageItem, Verb};

    fn echo() -> RequestEcho {
        RequestEcho {
            verb: Some(Verb::ListIdentifiers),
            metadata_prefix: Some("oai_dc".into()),
            base_url: "http://localhost/oai".into(),
            ..Default::default()
        }
    }

    fn header(id: &str) -> Header {
        Header::for_item("oai:localhost:diku/", &StorageItem::new(id))
    }

    #[test]
    fn envelope_with_errors() {
        let doc = OaiPmh::new(
            echo(),
            ResponseBody::Errors(vec![OaiError::no_records_match()]),
        );
        let xml = write_document(&doc).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<request verb=\"ListIdentifiers\" metadataPrefix=\"oai_dc\">http://localhost/oai</request>"
        ));
        assert!(xml.contains(
            "<error code=\"noRecordsMatch\">There is no any record found matching search criteria</error>"
        ));
        assert!(!xml.contains("<ListIdentifiers>"));
    }

    #[test]
    fn list_identifiers_with_token() {
        let doc = OaiPmh::new(
            echo(),
            ResponseBody::ListIdentifiers {
                headers: vec![header("a"), header("b")],
                resumption_token: Some(ResumptionTokenInfo {
                    value: "abc".into(),
                    complete_list_size: 12,
                    cursor: 0,
                }),
            },
        );
        let xml = write_document(&doc).unwrap();
        assert!(xml.contains("<identifier>oai:localhost:diku/a</identifier>"));
        assert!(xml.contains("<datestamp>1970-01-01T00:00:00Z</datestamp>"));
        assert!(xml.contains("<setSpec>all</setSpec>"));
        assert!(xml.contains(
            "<resumptionToken completeListSize=\"12\" cursor=\"0\">abc</resumptionToken>"
        ));
    }

    #[test]
    fn record_metadata_is_embedded_verbatim() {
        let record = Record {
            header: header("a"),
            metadata: "<dc:title>Caf&amp;e</dc:title>".into(),
        };
        let doc = OaiPmh::new(echo(), ResponseBody::GetRecord(record));
        let xml = write_document(&doc).unwrap();
        assert!(xml.contains("<metadata><dc:title>Caf&amp;e</dc:title></metadata>"));
    }

    #[test]
    fn text_is_escaped() {
        let mut xml = XmlBuilder::new();
        xml.element("title", &[("lang", "en\"")], "Fish & <Chips>").unwrap();
        assert_eq!(
            xml.finish().unwrap(),
            "<title lang=\"en&quot;\">Fish &amp; &lt;Chips&gt;</title>"
        );
    }

    #[test]
    fn identify_lists_compressions() {
        let identify = Identify {
            repository_name: "Repo".into(),
            base_url: "http://localhost/oai".into(),
            protocol_version: "2.0".into(),
            admin_emails: vec!["a@b.c".into()],
            earliest_datestamp: Datestamp::epoch(),
            deleted_record: DeletedRecords::No,
            granularity: "YYYY-MM-DDThh:mm:ssZ".into(),
            compressions: vec!["gzip".into(), "deflate".into()],
        };
        let doc = OaiPmh::new(echo(), ResponseBody::Identify(identify));
        let xml = write_document(&doc).unwrap();
        assert!(xml.contains("<compression>gzip</compression><compression>deflate</compression>"));
        assert!(xml.contains("<deletedRecord>no</deletedRecord>"));
        assert!(xml.contains("<earliestDatestamp>1970-01-01T00:00:00Z</earliestDatestamp>"));
    }
}
