//! Protocol entities a response is built from.
//!
//! These mirror the elements of an `OAI-PMH` document. Serialising them is
//! the job of the XML writer in the `oaigate` crate.

use crate::config::DeletedRecords;
use crate::request::Request;
use crate::storage::StorageItem;
use crate::types::{Datestamp, MetadataFormat, OaiError, SetSpec, Verb};

/// A record header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub identifier: String,
    pub datestamp: Datestamp,
    pub set_specs: Vec<String>,
}

impl Header {
    /// The header of a storage item: prefixed id, last-modified date, set `all`.
    pub fn for_item(identifier_prefix: &str, item: &StorageItem) -> Self {
        Self {
            identifier: format!("{}{}", identifier_prefix, item.id),
            datestamp: item.last_modified,
            set_specs: vec![SetSpec::all().spec],
        }
    }
}

/// A record: header plus the converted metadata fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub header: Header,
    /// Serialised metadata in the requested format.
    pub metadata: String,
}

/// The `resumptionToken` element of a list response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumptionTokenInfo {
    /// Empty on the last page of a paginated harvest.
    pub value: String,
    pub complete_list_size: u64,
    pub cursor: u64,
}

/// The arguments echoed back in the `request` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestEcho {
    pub verb: Option<Verb>,
    pub metadata_prefix: Option<String>,
    pub identifier: Option<String>,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
    pub resumption_token: Option<String>,
    pub base_url: String,
}

impl RequestEcho {
    /// Echo of `request`.
    ///
    /// A request restored from a token echoes only the verb and the token.
    /// Dates that are not valid datestamps are never echoed.
    pub fn from_request(request: &Request, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if request.is_restored() {
            return Self {
                verb: Some(request.verb()),
                resumption_token: request.resumption_token().map(str::to_string),
                base_url,
                ..Default::default()
            };
        }

        let datestamp = |value: Option<&str>| {
            value
                .filter(|v| Datestamp::parse(v).is_ok())
                .map(str::to_string)
        };

        Self {
            verb: Some(request.verb()),
            metadata_prefix: request.metadata_prefix().map(str::to_string),
            identifier: request.identifier().map(str::to_string),
            from: datestamp(request.from()),
            until: datestamp(request.until()),
            set: request.set().map(str::to_string),
            resumption_token: request.resumption_token().map(str::to_string),
            base_url,
        }
    }
}

/// Body of an Identify response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identify {
    pub repository_name: String,
    pub base_url: String,
    pub protocol_version: String,
    pub admin_emails: Vec<String>,
    pub earliest_datestamp: Datestamp,
    pub deleted_record: DeletedRecords,
    pub granularity: String,
    pub compressions: Vec<String>,
}

/// What follows the `request` element: errors or exactly one verb body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseBody {
    Errors(Vec<OaiError>),
    Identify(Identify),
    ListMetadataFormats(Vec<MetadataFormat>),
    ListSets(Vec<SetSpec>),
    ListIdentifiers {
        headers: Vec<Header>,
        resumption_token: Option<ResumptionTokenInfo>,
    },
    ListRecords {
        records: Vec<Record>,
        resumption_token: Option<ResumptionTokenInfo>,
    },
    GetRecord(Record),
}

/// A complete response document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OaiPmh {
    pub response_date: Datestamp,
    pub request: RequestEcho,
    pub body: ResponseBody,
}

impl OaiPmh {
    /// A document dated now.
    pub fn new(request: RequestEcho, body: ResponseBody) -> Self {
        Self {
            response_date: Datestamp::now(),
            request,
            body,
        }
    }

    /// The protocol errors carried, empty for a successful response.
    pub fn errors(&self) -> &[OaiError] {
        match &self.body {
            ResponseBody::Errors(errors) => errors,
            _ => &[],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}
