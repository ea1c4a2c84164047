//! Storage adapters.
//!
//! An adapter knows the shape of one backend: which endpoints list items and
//! return a single record's metadata, and where ids, dates and payloads live
//! inside the JSON it returns. Adapters do no I/O; the engine pairs them with
//! a [`Storage`](crate::Storage) transport.

mod instances;
mod source_records;

pub use instances::InstanceStorage;
pub use source_records::SourceRecordStorage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cql::CqlQueryBuilder;
use crate::error::Error;
use crate::request::Request;
use crate::types::Datestamp;

/// One item of a backend listing.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageItem {
    /// Backend id, the suffix of the protocol identifier.
    pub id: String,
    /// Last update, falling back to creation, falling back to the epoch.
    pub last_modified: Datestamp,
    /// Metadata carried inline in the listing, if the backend embeds it.
    pub payload: Option<Value>,
}

impl StorageItem {
    /// An item with only an id, dated at the epoch.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_modified: Datestamp::epoch(),
            payload: None,
        }
    }
}

/// A parsed listing page.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemPage {
    /// Items in backend order.
    pub items: Vec<StorageItem>,
    /// Size of the whole result set, as reported by the backend.
    pub total_records: u64,
}

/// The operations every storage adapter provides.
pub trait StorageBackend {
    /// Path of the listing resource.
    fn list_path(&self) -> &'static str;

    /// Name of the array holding items in a listing body.
    fn items_field(&self) -> &'static str;

    /// Backend field compared against a storage id in `id==` queries.
    fn id_field(&self) -> &'static str;

    /// A criterion every listing query starts with, if any.
    fn source_criterion(&self) -> Option<(&'static str, &'static str)> {
        None
    }

    /// A criterion excluding records hidden from discovery.
    fn suppression_criterion(&self) -> (&'static str, &'static str);

    /// Endpoint returning a single record's metadata.
    fn build_metadata_endpoint(&self, id: &str) -> String;

    /// Pull the metadata payload out of a metadata response body.
    fn extract_metadata_payload(&self, body: &Value) -> Option<Value>;

    /// Pull the payload carried inline in a listing item.
    fn extract_inline_payload(&self, _item: &Value) -> Option<Value> {
        None
    }

    fn extract_id(&self, item: &Value) -> Option<String> {
        item.get(self.id_field())
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Updated date, else created date, else the epoch.
    fn extract_last_modified(&self, item: &Value) -> Datestamp {
        let metadata = item.get("metadata");
        ["updatedDate", "createdDate"]
            .iter()
            .filter_map(|field| metadata.and_then(|m| m.get(*field)).and_then(Value::as_str))
            .find_map(parse_backend_date)
            .unwrap_or_else(Datestamp::epoch)
    }

    fn extract_items<'a>(&self, body: &'a Value) -> Result<&'a [Value], Error> {
        match body.get(self.items_field()) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(&[]),
            Some(_) => Err(Error::payload(format!(
                "'{}' is not an array",
                self.items_field()
            ))),
        }
    }

    fn extract_total(&self, body: &Value) -> Option<u64> {
        body.get("totalRecords").and_then(Value::as_u64)
    }

    /// Build the paginated listing endpoint for `request`.
    ///
    /// The query starts with the source criterion, then either the storage id
    /// (when a single-item request names an identifier) or the date range.
    /// List verbs never narrow by identifier.
    fn build_list_endpoint(
        &self,
        request: &Request,
        limit: u64,
        skip_suppressed: bool,
    ) -> Result<String, Error> {
        let mut query = CqlQueryBuilder::new();
        if let Some((key, value)) = self.source_criterion() {
            query = query.add_strict_criteria(key, value);
        }

        let identifier = request
            .storage_identifier()
            .filter(|_| !request.verb().is_list());
        if let Some(id) = identifier {
            if !query.is_empty() {
                query = query.and();
            }
            query = query.add_strict_criteria(self.id_field(), id);
        } else if request.from().is_some() || request.until().is_some() {
            if !query.is_empty() {
                query = query.and();
            }
            query = query.date_range(request.from(), request.until())?;
        }

        if skip_suppressed {
            if !query.is_empty() {
                query = query.and();
            }
            let (key, value) = self.suppression_criterion();
            query = query.add_strict_criteria(key, value);
        }

        let paging = format!("offset={}&limit={}", request.offset(), limit);
        Ok(if query.is_empty() {
            format!("{}?{}", self.list_path(), paging)
        } else {
            format!("{}{}&{}", self.list_path(), query.build(), paging)
        })
    }

    /// Parse a listing body into items in backend order.
    fn parse_page(&self, body: &Value) -> Result<ItemPage, Error> {
        let raw = self.extract_items(body)?;
        let mut items = Vec::with_capacity(raw.len());
        for item in raw {
            let id = self
                .extract_id(item)
                .ok_or_else(|| Error::payload(format!("item without '{}'", self.id_field())))?;
            items.push(StorageItem {
                id,
                last_modified: self.extract_last_modified(item),
                payload: self.extract_inline_payload(item),
            });
        }
        let total_records = self.extract_total(body).unwrap_or(items.len() as u64);
        Ok(ItemPage {
            items,
            total_records,
        })
    }
}

/// Backend dates are RFC 3339, or use a `+0000` style offset.
fn parse_backend_date(value: &str) -> Option<Datestamp> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| Datestamp::from(dt.with_timezone(&Utc)))
}

/// Which backend the gateway fronts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    #[default]
    Instances,
    SourceRecords,
}

/// The adapter for the configured backend, chosen once at startup.
#[derive(Clone, Debug)]
pub enum StorageAdapter {
    Instances(InstanceStorage),
    SourceRecords(SourceRecordStorage),
}

impl StorageAdapter {
    pub fn new(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Instances => StorageAdapter::Instances(InstanceStorage),
            BackendKind::SourceRecords => StorageAdapter::SourceRecords(SourceRecordStorage),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StorageAdapter::Instances(_) => BackendKind::Instances,
            StorageAdapter::SourceRecords(_) => BackendKind::SourceRecords,
        }
    }

    fn backend(&self) -> &dyn StorageBackend {
        match self {
            StorageAdapter::Instances(b) => b,
            StorageAdapter::SourceRecords(b) => b,
        }
    }
}

impl StorageBackend for StorageAdapter {
    fn list_path(&self) -> &'static str {
        self.backend().list_path()
    }

    fn items_field(&self) -> &'static str {
        self.backend().items_field()
    }

    fn id_field(&self) -> &'static str {
        self.backend().id_field()
    }

    fn source_criterion(&self) -> Option<(&'static str, &'static str)> {
        self.backend().source_criterion()
    }

    fn suppression_criterion(&self) -> (&'static str, &'static str) {
        self.backend().suppression_criterion()
    }

    fn build_metadata_endpoint(&self, id: &str) -> String {
        self.backend().build_metadata_endpoint(id)
    }

    fn extract_metadata_payload(&self, body: &Value) -> Option<Value> {
        self.backend().extract_metadata_payload(body)
    }

    fn extract_inline_payload(&self, item: &Value) -> Option<Value> {
        self.backend().extract_inline_payload(item)
    }
}
