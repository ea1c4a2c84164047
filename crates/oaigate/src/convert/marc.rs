//! MARC-in-JSON records.
//!
//! The backend stores MARC as
//! `{"leader": "...", "fields": [{"001": "..."}, {"245": {"ind1": "1", "ind2": "0", "subfields": [{"a": "..."}]}}]}`.
//! Source-record storage may hand the same structure over as a JSON string.

use serde_json::Value;

use oaigate_core::error::ConvertError;

/// A MARC field: control fields carry a value, data fields carry subfields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Control {
        tag: String,
        value: String,
    },
    Data {
        tag: String,
        ind1: String,
        ind2: String,
        subfields: Vec<(String, String)>,
    },
}

impl Field {
    pub fn tag(&self) -> &str {
        match self {
            Field::Control { tag, .. } | Field::Data { tag, .. } => tag,
        }
    }

    /// Values of subfield `code`, in order.
    pub fn subfield_values<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let subfields: &[(String, String)] = match self {
            Field::Data { subfields, .. } => subfields,
            Field::Control { .. } => &[],
        };
        subfields
            .iter()
            .filter(move |(c, _)| c == code)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarcRecord {
    pub leader: String,
    pub fields: Vec<Field>,
}

fn malformed(reason: impl Into<String>) -> ConvertError {
    ConvertError::Malformed {
        reason: reason.into(),
    }
}

fn string_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl MarcRecord {
    /// Parse a MARC-JSON payload, accepting a JSON-encoded string as well.
    pub fn from_json(payload: &Value) -> Result<Self, ConvertError> {
        if let Value::String(text) = payload {
            let parsed: Value = serde_json::from_str(text)
                .map_err(|e| malformed(format!("content is not JSON: {}", e)))?;
            return Self::from_json(&parsed);
        }

        let object = payload
            .as_object()
            .ok_or_else(|| malformed("record is not an object"))?;
        let leader = object
            .get("leader")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let raw_fields = match object.get("fields") {
            Some(Value::Array(fields)) => fields.as_slice(),
            Some(_) => return Err(malformed("'fields' is not an array")),
            None => &[],
        };

        let mut fields = Vec::with_capacity(raw_fields.len());
        for raw in raw_fields {
            let entry = raw
                .as_object()
                .ok_or_else(|| malformed("field is not an object"))?;
            for (tag, content) in entry {
                fields.push(parse_field(tag, content)?);
            }
        }

        Ok(Self { leader, fields })
    }

    pub fn fields_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.tag() == tag)
    }

    /// Values of `tag$code` across all occurrences of the field.
    pub fn subfield_values<'a>(
        &'a self,
        tag: &'a str,
        code: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.fields_with_tag(tag)
            .flat_map(move |f| f.subfield_values(code))
    }
}

fn parse_field(tag: &str, content: &Value) -> Result<Field, ConvertError> {
    let Value::Object(data) = content else {
        return Ok(Field::Control {
            tag: tag.to_string(),
            value: string_of(content),
        });
    };

    let indicator = |name: &str| {
        data.get(name)
            .map(string_of)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| " ".to_string())
    };

    let mut subfields = Vec::new();
    if let Some(raw) = data.get("subfields") {
        let list = raw
            .as_array()
            .ok_or_else(|| malformed(format!("subfields of {} are not an array", tag)))?;
        for subfield in list {
            let entry = subfield
                .as_object()
                .ok_or_else(|| malformed(format!("subfield of {} is not an object", tag)))?;
            for (code, value) in entry {
                subfields.push((code.clone(), string_of(value)));
            }
        }
    }

    Ok(Field::Data {
        tag: tag.to_string(),
        ind1: indicator("ind1"),
        ind2: indicator("ind2"),
        subfields,
    })
}
