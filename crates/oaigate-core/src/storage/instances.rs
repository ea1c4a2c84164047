//! Instance storage: the bibliographic instance catalog.

use serde_json::Value;

use super::StorageBackend;

const INSTANCES_PATH: &str = "/instance-storage/instances";

/// Adapter for `/instance-storage/instances`.
///
/// Items are instances; metadata is the MARC JSON source record attached to
/// each instance, and the whole response body is the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstanceStorage;

impl StorageBackend for InstanceStorage {
    fn list_path(&self) -> &'static str {
        INSTANCES_PATH
    }

    fn items_field(&self) -> &'static str {
        "instances"
    }

    fn id_field(&self) -> &'static str {
        "id"
    }

    fn suppression_criterion(&self) -> (&'static str, &'static str) {
        ("discoverySuppress", "false")
    }

    fn build_metadata_endpoint(&self, id: &str) -> String {
        format!("{}/{}/source-record/marc-json", INSTANCES_PATH, id)
    }

    fn extract_metadata_payload(&self, body: &Value) -> Option<Value> {
        match body {
            Value::Null => None,
            other => Some(other.clone()),
        }
    }
}
