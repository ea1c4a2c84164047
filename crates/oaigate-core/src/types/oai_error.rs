//! Protocol error codes and the errors carried inside a response.

use std::fmt;

/// The protocol error codes a harvesting response may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadArgument,
    BadResumptionToken,
    BadVerb,
    CannotDisseminateFormat,
    IdDoesNotExist,
    NoRecordsMatch,
    NoMetadataFormats,
    NoSetHierarchy,
}

impl ErrorCode {
    /// Returns the code as written in the `code` attribute of `<error>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadArgument => "badArgument",
            ErrorCode::BadResumptionToken => "badResumptionToken",
            ErrorCode::BadVerb => "badVerb",
            ErrorCode::CannotDisseminateFormat => "cannotDisseminateFormat",
            ErrorCode::IdDoesNotExist => "idDoesNotExist",
            ErrorCode::NoRecordsMatch => "noRecordsMatch",
            ErrorCode::NoMetadataFormats => "noMetadataFormats",
            ErrorCode::NoSetHierarchy => "noSetHierarchy",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) const CANNOT_DISSEMINATE_FORMAT: &str =
    "The value of the metadataPrefix argument is not supported by the repository";
pub(crate) const RESUMPTION_TOKEN_FORMAT: &str =
    "The value of the resumptionToken argument is invalid";
pub(crate) const RESUMPTION_TOKEN_FLOW: &str =
    "There were substantial changes to the repository and continuing may result in missing records.";
pub(crate) const MISSING_REQUIRED_ARGUMENTS: &str =
    "The request is missing required arguments. There is no metadataPrefix nor resumptionToken";
pub(crate) const ILLEGAL_ARGUMENTS: &str =
    "The request includes resumptionToken and other argument(s)";
pub(crate) const NO_RECORDS_FOUND: &str = "There is no any record found matching search criteria";
pub(crate) const INVALID_DATE_RANGE: &str =
    "Invalid date range: 'from' must be less than or equal to 'until'.";

/// A protocol error: a code plus a human-readable message.
///
/// Several may be present in one response; a response carrying errors never
/// carries a verb body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OaiError {
    pub code: ErrorCode,
    pub message: String,
}

impl OaiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn cannot_disseminate_format() -> Self {
        Self::new(ErrorCode::CannotDisseminateFormat, CANNOT_DISSEMINATE_FORMAT)
    }

    /// The token could not be decoded, or was supplied where none is allowed.
    pub fn bad_resumption_token() -> Self {
        Self::new(ErrorCode::BadResumptionToken, RESUMPTION_TOKEN_FORMAT)
    }

    /// The backend result set drifted and resuming would skip records.
    pub fn resumption_flow_broken() -> Self {
        Self::new(ErrorCode::BadResumptionToken, RESUMPTION_TOKEN_FLOW)
    }

    pub fn missing_required_arguments() -> Self {
        Self::new(ErrorCode::BadArgument, MISSING_REQUIRED_ARGUMENTS)
    }

    pub fn illegal_arguments() -> Self {
        Self::new(ErrorCode::BadArgument, ILLEGAL_ARGUMENTS)
    }

    pub fn no_records_match() -> Self {
        Self::new(ErrorCode::NoRecordsMatch, NO_RECORDS_FOUND)
    }

    /// A `from` or `until` value that is not a strict datestamp.
    pub fn bad_datestamp(param: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::BadArgument,
            format!("Bad datestamp format for '{}={}' argument.", param, value),
        )
    }

    pub fn invalid_date_range() -> Self {
        Self::new(ErrorCode::BadArgument, INVALID_DATE_RANGE)
    }

    /// The identifier is not one this repository hands out.
    pub fn bad_identifier(identifier: &str) -> Self {
        Self::new(
            ErrorCode::BadArgument,
            format!("Identifier '{}' has invalid structure", identifier),
        )
    }

    pub fn id_does_not_exist(identifier: &str) -> Self {
        Self::new(
            ErrorCode::IdDoesNotExist,
            format!(
                "No matching identifier in repository for identifier '{}'",
                identifier
            ),
        )
    }
}

impl fmt::Display for OaiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
