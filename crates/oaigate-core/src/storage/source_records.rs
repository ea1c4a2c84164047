//! Source-record storage: raw cataloguing records.

use serde_json::Value;

use super::StorageBackend;

const RESULT_PATH: &str = "/source-storage/result";
const RECORD_PATH: &str = "/source-storage/record";

/// Adapter for `/source-storage/result`.
///
/// Items carry their parsed record inline under `parsedRecord.content`,
/// either as a JSON object or as a JSON-encoded string.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceRecordStorage;

impl SourceRecordStorage {
    /// The instance a source record describes.
    pub fn extract_instance_id(&self, item: &Value) -> Option<String> {
        item.pointer("/externalIdsHolder/instanceId")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

fn parsed_content(record: &Value) -> Option<Value> {
    match record.pointer("/parsedRecord/content") {
        None | Some(Value::Null) => None,
        Some(content) => Some(content.clone()),
    }
}

impl StorageBackend for SourceRecordStorage {
    fn list_path(&self) -> &'static str {
        RESULT_PATH
    }

    fn items_field(&self) -> &'static str {
        "results"
    }

    fn id_field(&self) -> &'static str {
        "recordId"
    }

    fn source_criterion(&self) -> Option<(&'static str, &'static str)> {
        Some(("recordType", "MARC"))
    }

    fn suppression_criterion(&self) -> (&'static str, &'static str) {
        ("additionalInfo.suppressDiscovery", "false")
    }

    fn build_metadata_endpoint(&self, id: &str) -> String {
        format!("{}/{}", RECORD_PATH, id)
    }

    fn extract_metadata_payload(&self, body: &Value) -> Option<Value> {
        parsed_content(body)
    }

    fn extract_inline_payload(&self, item: &Value) -> Option<Value> {
        parsed_content(item)
    }
}
