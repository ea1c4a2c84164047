//! CQL query builder for backend listing queries.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use url::form_urlencoded;

use crate::error::{Error, InvalidInputError};

/// Backend date format: millisecond precision, UTC.
const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const UPDATED_DATE: &str = "metadata.updatedDate";

/// Incrementally builds a CQL query string.
///
/// Protocol datestamps have second granularity while the backend stores
/// milliseconds, so `until` is turned into an exclusive bound one second (or
/// one day, for a plain date) past the requested value.
///
/// # Example
///
/// ```
/// use oaigate_core::CqlQueryBuilder;
///
/// let query = CqlQueryBuilder::new()
///     .add_strict_criteria("recordType", "MARC")
///     .and()
///     .date_range(Some("2018-01-01"), None)
///     .unwrap();
/// assert_eq!(query.cql(), "recordType==MARC and metadata.updatedDate>=2018-01-01T00:00:00.000Z");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CqlQueryBuilder {
    query: String,
}

impl CqlQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key==value`.
    pub fn add_strict_criteria(mut self, key: &str, value: &str) -> Self {
        self.query.push_str(key);
        self.query.push_str("==");
        self.query.push_str(value);
        self
    }

    /// Append a range over `metadata.updatedDate`. Either bound may be absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is neither an RFC 3339 timestamp nor a
    /// `YYYY-MM-DD` date.
    pub fn date_range(mut self, from: Option<&str>, until: Option<&str>) -> Result<Self, Error> {
        let from = from.filter(|s| !s.is_empty());
        let until = until.filter(|s| !s.is_empty());

        if let Some(from) = from {
            let bound = parse_bound(from, false)?;
            self.query
                .push_str(&format!("{}>={}", UPDATED_DATE, bound.format(QUERY_DATE_FORMAT)));
            if until.is_some() {
                self = self.and();
            }
        }

        if let Some(until) = until {
            let bound = parse_bound(until, true)?;
            self.query
                .push_str(&format!("{}<{}", UPDATED_DATE, bound.format(QUERY_DATE_FORMAT)));
        }

        Ok(self)
    }

    pub fn and(mut self) -> Self {
        self.query.push_str(" and ");
        self
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// The raw, unencoded CQL.
    pub fn cql(&self) -> &str {
        &self.query
    }

    /// `?query=` followed by the form-encoded CQL.
    pub fn build(&self) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.query.as_bytes()).collect();
        format!("?query={}", encoded)
    }
}

fn parse_bound(value: &str, exclusive_upper: bool) -> Result<NaiveDateTime, Error> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        let dt = dt.naive_utc();
        return Ok(if exclusive_upper {
            dt + Duration::seconds(1)
        } else {
            dt
        });
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        Error::from(InvalidInputError::Date {
            value: value.to_string(),
            reason: e.to_string(),
        })
    })?;
    let date = if exclusive_upper {
        date + Duration::days(1)
    } else {
        date
    };
    Ok(date.and_time(chrono::NaiveTime::MIN))
}
