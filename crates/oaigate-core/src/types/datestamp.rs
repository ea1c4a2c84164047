//! Protocol datestamp type.

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Wire format of a datestamp at second granularity.
pub const DATESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A UTC instant truncated to whole seconds.
///
/// Parsing only accepts the strict `YYYY-MM-DDThh:mm:ssZ` form; offsets,
/// fractional seconds and plain dates are rejected.
///
/// # Example
///
/// ```
/// use oaigate_core::Datestamp;
///
/// let ts = Datestamp::parse("2018-05-01T10:00:00Z").unwrap();
/// assert_eq!(ts.to_string(), "2018-05-01T10:00:00Z");
/// assert!(Datestamp::parse("2018-05-01").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Datestamp(DateTime<Utc>);

impl Datestamp {
    /// Parse a strict protocol datestamp.
    pub fn parse(s: &str) -> Result<Self, Error> {
        NaiveDateTime::parse_from_str(s, DATESTAMP_FORMAT)
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
            .map_err(|e| {
                InvalidInputError::Date {
                    value: s.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// The current instant, truncated to seconds.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// 1970-01-01T00:00:00Z, the earliest datestamp the repository reports.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl From<DateTime<Utc>> for Datestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(0))
    }
}

impl fmt::Display for Datestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATESTAMP_FORMAT))
    }
}

impl FromStr for Datestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
