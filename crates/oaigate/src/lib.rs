//! oaigate - OAI-PMH harvesting engine
//!
//! Answers the six OAI-PMH verbs against a record-storage backend reached
//! through [`oaigate_core::Storage`]. A [`Gateway`] is built once from the
//! repository configuration; every incoming request goes through
//! [`Gateway::handle`], which validates it, pages through storage, converts
//! metadata and returns a document ready for [`OaiResponse::to_xml`].
//!
//! # Example
//!
//! ```no_run
//! use oaigate::Gateway;
//! use oaigate_core::{BackendKind, RepositoryConfig, Request, Storage, Verb};
//!
//! # async fn example(storage: &dyn Storage) -> Result<(), oaigate_core::Error> {
//! let config = RepositoryConfig::new("https://library.example/oai", "admin@library.example");
//! let gateway = Gateway::new(config, BackendKind::Instances)?;
//!
//! let request = Request::builder(Verb::ListIdentifiers, gateway.tenant_context("diku"))
//!     .metadata_prefix("oai_dc")
//!     .build();
//! let response = gateway.handle(storage, request).await?;
//! println!("{} {}", response.status, response.to_xml()?);
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod fetch;
pub mod gateway;
pub mod verbs;
pub mod xml;

pub use convert::{ConverterRegistry, DublinCoreConverter, Marc21Converter};
pub use gateway::{Gateway, OaiResponse};
pub use verbs::{HarvestContext, VerbHandler};
