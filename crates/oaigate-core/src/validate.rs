//! Request argument validation.
//!
//! Validation never touches the backend. Every function returns the full list
//! of protocol errors found; an empty list means the request may proceed.

use crate::request::Request;
use crate::types::{Datestamp, OaiError};

/// The metadata prefixes and set specs the repository accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationRules {
    prefixes: Vec<String>,
    sets: Vec<String>,
}

impl ValidationRules {
    pub fn new<P, S>(prefixes: P, sets: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            sets: sets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supports_prefix(&self, prefix: &str) -> bool {
        self.prefixes.iter().any(|p| p == prefix)
    }

    pub fn supports_set(&self, set: &str) -> bool {
        self.sets.iter().any(|s| s == set)
    }

    /// Validate a ListRecords or ListIdentifiers request.
    ///
    /// A resumption token combined with other harvesting arguments yields a
    /// single `badArgument` and nothing else.
    pub fn validate_list_request(&self, request: &Request) -> Vec<OaiError> {
        if request.resumption_token().is_some()
            && !request.is_restored()
            && request.has_harvest_arguments()
        {
            return vec![OaiError::illegal_arguments()];
        }

        let mut errors = Vec::new();

        match request.metadata_prefix() {
            Some(prefix) if !self.supports_prefix(prefix) => {
                errors.push(OaiError::cannot_disseminate_format())
            }
            Some(_) => {}
            None => errors.push(OaiError::missing_required_arguments()),
        }

        if let Some(set) = request.set() {
            if !self.supports_set(set) {
                errors.push(OaiError::no_records_match());
            }
        }

        validate_date_range(request, &mut errors);
        errors
    }

    /// Validate a GetRecord request.
    pub fn validate_get_record_request(&self, request: &Request) -> Vec<OaiError> {
        let mut errors = Vec::new();

        match request.metadata_prefix() {
            Some(prefix) if !self.supports_prefix(prefix) => {
                errors.push(OaiError::cannot_disseminate_format())
            }
            Some(_) => {}
            None => errors.push(OaiError::missing_required_arguments()),
        }

        if !validate_identifier(request) {
            errors.push(OaiError::bad_identifier(
                request.identifier().unwrap_or_default(),
            ));
        }

        errors
    }
}

/// True when the request names a storage id under the tenant identifier prefix.
pub fn validate_identifier(request: &Request) -> bool {
    request.has_valid_identifier()
}

/// Parse an optional datestamp argument, recording a `badArgument` on failure.
fn parse_datestamp(param: &str, value: Option<&str>, errors: &mut Vec<OaiError>) -> Option<Datestamp> {
    let value = value?;
    match Datestamp::parse(value) {
        Ok(ts) => Some(ts),
        Err(_) => {
            errors.push(OaiError::bad_datestamp(param, value));
            None
        }
    }
}

fn validate_date_range(request: &Request, errors: &mut Vec<OaiError>) {
    let from = parse_datestamp("from", request.from(), errors);
    let until = parse_datestamp("until", request.until(), errors);
    if let (Some(from), Some(until)) = (from, until) {
        if from > until {
            errors.push(OaiError::invalid_date_range());
        }
    }
}
