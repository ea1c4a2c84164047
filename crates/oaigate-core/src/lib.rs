//! oaigate-core - Core OAI-PMH protocol types and traits.
//!
//! This crate holds everything about the harvesting protocol that does not
//! touch the network: the request model and its validation, the resumption
//! token codec, the CQL query builder, the storage adapters that know the
//! shape of backend items, and the protocol entities a response is built from.

pub mod config;
pub mod cql;
pub mod error;
pub mod protocol;
pub mod request;
pub mod storage;
pub mod token;
pub mod traits;
pub mod types;
pub mod validate;

pub use config::{DeletedRecords, RepositoryConfig, StorageConfig};
pub use cql::CqlQueryBuilder;
pub use error::{BackendError, ConvertError, Error, InvalidInputError, TransportError};
pub use protocol::{
    Header, Identify, OaiPmh, Record, RequestEcho, ResponseBody, ResumptionTokenInfo,
};
pub use request::{Request, RequestBuilder, RequestParams, TenantContext};
pub use storage::{
    BackendKind, InstanceStorage, ItemPage, SourceRecordStorage, StorageAdapter, StorageBackend,
    StorageItem,
};
pub use token::{ResumptionToken, TokenError, TokenOutcome, can_resume, next_token, restore_request};
pub use traits::{MetadataConverter, Storage};
pub use types::{Datestamp, ErrorCode, MetadataFormat, OaiError, SetSpec, Verb};
pub use validate::{ValidationRules, validate_identifier};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
