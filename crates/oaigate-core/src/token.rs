//! Resumption token codec and pagination consistency check.
//!
//! A token is the base64url encoding (no padding) of a form-urlencoded
//! string:
//!
//! ```text
//! metadataPrefix=oai_dc&until=2018-06-01T00:00:00Z&offset=10&totalRecords=100&nextRecordId=...
//! ```
//!
//! It replays the original query plus a position marker, so the server keeps
//! no harvest state between calls.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;
use tracing::trace;
use url::form_urlencoded;

use crate::request::Request;
use crate::storage::StorageItem;
use crate::types::Datestamp;

const METADATA_PREFIX: &str = "metadataPrefix";
const FROM: &str = "from";
const UNTIL: &str = "until";
const SET: &str = "set";
const OFFSET: &str = "offset";
const TOTAL_RECORDS: &str = "totalRecords";
const NEXT_RECORD_ID: &str = "nextRecordId";

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a token string cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not valid base64url")]
    Base64,

    #[error("token payload is not UTF-8")]
    Utf8,

    #[error("token is missing '{0}'")]
    MissingField(&'static str),

    #[error("token field '{field}' is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("token offset {offset} is past its total of {total_records}")]
    OffsetOutOfRange { offset: u64, total_records: u64 },
}

/// The decoded content of a resumption token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumptionToken {
    pub metadata_prefix: String,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
    pub offset: u64,
    pub total_records: u64,
    pub next_record_id: String,
}

impl ResumptionToken {
    /// Encode to the wire form.
    pub fn encode(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair(METADATA_PREFIX, &self.metadata_prefix);
        if let Some(ref from) = self.from {
            query.append_pair(FROM, from);
        }
        if let Some(ref until) = self.until {
            query.append_pair(UNTIL, until);
        }
        if let Some(ref set) = self.set {
            query.append_pair(SET, set);
        }
        query.append_pair(OFFSET, &self.offset.to_string());
        query.append_pair(TOTAL_RECORDS, &self.total_records.to_string());
        query.append_pair(NEXT_RECORD_ID, &self.next_record_id);
        TOKEN_ENGINE.encode(query.finish())
    }

    /// Decode a wire token. Unknown keys are ignored.
    pub fn decode(raw: &str) -> Result<Self, TokenError> {
        let bytes = TOKEN_ENGINE
            .decode(raw.trim())
            .map_err(|_| TokenError::Base64)?;
        let text = String::from_utf8(bytes).map_err(|_| TokenError::Utf8)?;
        trace!(token = %text, "decoded resumption token");

        let mut metadata_prefix = None;
        let mut from = None;
        let mut until = None;
        let mut set = None;
        let mut offset = None;
        let mut total_records = None;
        let mut next_record_id = None;

        for (key, value) in form_urlencoded::parse(text.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                METADATA_PREFIX => metadata_prefix = Some(value),
                FROM => from = Some(value),
                UNTIL => until = Some(value),
                SET => set = Some(value),
                OFFSET => offset = Some(parse_number(OFFSET, value)?),
                TOTAL_RECORDS => total_records = Some(parse_number(TOTAL_RECORDS, value)?),
                NEXT_RECORD_ID => next_record_id = Some(value),
                _ => {}
            }
        }

        let offset = offset.ok_or(TokenError::MissingField(OFFSET))?;
        let total_records = total_records.ok_or(TokenError::MissingField(TOTAL_RECORDS))?;
        // Issued tokens always point inside the harvest.
        if offset > total_records {
            return Err(TokenError::OffsetOutOfRange {
                offset,
                total_records,
            });
        }

        Ok(Self {
            metadata_prefix: metadata_prefix.ok_or(TokenError::MissingField(METADATA_PREFIX))?,
            from,
            until,
            set,
            offset,
            total_records,
            next_record_id: next_record_id.ok_or(TokenError::MissingField(NEXT_RECORD_ID))?,
        })
    }
}

fn parse_number(field: &'static str, value: String) -> Result<u64, TokenError> {
    value
        .parse()
        .map_err(|_| TokenError::InvalidNumber { field, value })
}

/// Rebuild the request a token stands for. `request` must carry the token.
pub fn restore_request(request: &Request) -> Result<Request, TokenError> {
    let raw = request
        .resumption_token()
        .ok_or(TokenError::MissingField("resumptionToken"))?;
    let token = ResumptionToken::decode(raw)?;
    Ok(request.restore(&token))
}

/// What a list response says about further pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenOutcome {
    /// More pages follow; carries the encoded token.
    Next(String),
    /// The harvest was paginated and this is its last page.
    EndOfList,
    /// A single page; no resumption token element at all.
    None,
}

impl TokenOutcome {
    /// The token value to emit, if any element is emitted at all.
    pub fn value(&self) -> Option<&str> {
        match self {
            TokenOutcome::Next(token) => Some(token),
            TokenOutcome::EndOfList => Some(""),
            TokenOutcome::None => None,
        }
    }
}

/// Decide the token for the page just fetched for `request`.
///
/// `page` is the page as the backend returned it, before any record was
/// dropped for missing metadata. The continuation carries the id of its last
/// item.
pub fn next_token(
    request: &Request,
    page: &[StorageItem],
    total_records: u64,
    page_size: u64,
) -> TokenOutcome {
    let new_offset = match request.offset().checked_add(page_size) {
        Some(offset) if offset < total_records => offset,
        _ => return end_of(request),
    };

    let Some(last) = page.last() else {
        return end_of(request);
    };
    let until = match request.until() {
        Some(until) => until.to_string(),
        None => Datestamp::now().to_string(),
    };
    let token = ResumptionToken {
        metadata_prefix: request.metadata_prefix().unwrap_or_default().to_string(),
        from: request.from().map(str::to_string),
        until: Some(until),
        set: request.set().map(str::to_string),
        offset: new_offset,
        total_records,
        next_record_id: last.id.clone(),
    };
    TokenOutcome::Next(token.encode())
}

fn end_of(request: &Request) -> TokenOutcome {
    if request.is_restored() {
        TokenOutcome::EndOfList
    } else {
        TokenOutcome::None
    }
}

/// Check that continuing a restored harvest will not skip records.
///
/// Safe when the page is non-empty and either the backend total did not
/// shrink or the page starts exactly at the id the token expects.
pub fn can_resume(request: &Request, total_records: u64, page: &[StorageItem]) -> bool {
    let Some(first) = page.first() else {
        return false;
    };
    let previous_total = request.total_records().unwrap_or(0);
    total_records >= previous_total || request.next_record_id() == Some(first.id.as_str())
}
