//! Error types for oaigate.
//!
//! Protocol-level problems (bad arguments, unknown identifiers, ...) are not
//! errors in this sense: they are [`OaiError`](crate::OaiError) values carried
//! inside a well-formed response. The [`Error`] type here covers everything
//! that prevents a response from being built at all: backend transport
//! failures, unexpected backend statuses, undecodable payloads, conversion
//! failures and invalid configuration.

use std::fmt;
use thiserror::Error;

/// The unified error type for oaigate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The storage backend answered with a status the engine cannot handle.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The storage backend answered with a body of an unexpected shape.
    #[error("unexpected backend payload: {message}")]
    Payload { message: String },

    /// A record could not be converted into the requested metadata format.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConvertError),

    /// Input validation errors (configuration values, dates handed to the
    /// query builder).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The XML envelope could not be written.
    #[error("xml error: {message}")]
    Xml { message: String },
}

impl Error {
    /// Shorthand for an [`Error::Payload`].
    pub fn payload(message: impl Into<String>) -> Self {
        Error::Payload {
            message: message.into(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success, non-404 answer from the storage backend.
#[derive(Debug)]
pub struct BackendError {
    /// HTTP status code.
    pub status: u16,
    /// The endpoint that was called.
    pub endpoint: String,
    /// Response body, if it could be read.
    pub body: Option<String>,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}", self.status, self.endpoint)?;
        if let Some(ref body) = self.body {
            write!(f, ": {}", body)?;
        }
        Ok(())
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    /// Create a new backend error.
    pub fn new(status: u16, endpoint: impl Into<String>, body: Option<String>) -> Self {
        Self {
            status,
            endpoint: endpoint.into(),
            body,
        }
    }
}

/// Metadata conversion errors.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No converter is registered for the metadata prefix.
    #[error("unsupported metadata format '{prefix}'")]
    UnsupportedFormat { prefix: String },

    /// The backend payload is not a record the converter understands.
    #[error("malformed source record: {reason}")]
    Malformed { reason: String },

    /// Writing the converted fragment failed.
    #[error("failed to write metadata: {message}")]
    Encoding { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// A date that is neither a UTC timestamp nor a plain date.
    #[error("invalid date '{value}': {reason}")]
    Date { value: String, reason: String },

    /// Invalid repository or storage configuration.
    #[error("invalid configuration '{field}': {reason}")]
    Config { field: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
