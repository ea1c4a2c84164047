//! The entry point: one [`Gateway`] per process, one [`Gateway::handle`] per
//! request.

use std::sync::Arc;

use tracing::{error, instrument};

use oaigate_core::{
    BackendKind, OaiPmh, RepositoryConfig, Request, Result, SetSpec, Storage, StorageAdapter,
    TenantContext, ValidationRules, Verb,
};

use crate::convert::ConverterRegistry;
use crate::verbs::{
    GetRecordHandler, HarvestContext, IdentifyHandler, ListHandler, MetadataFormatsHandler,
    SetsHandler, run,
};
use crate::xml;

/// A response document and the HTTP status it goes out with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OaiResponse {
    pub status: u16,
    pub document: OaiPmh,
}

impl OaiResponse {
    /// Serialise the document.
    pub fn to_xml(&self) -> Result<String> {
        xml::write_document(&self.document)
    }
}

/// Immutable harvesting state shared by all requests.
///
/// Cloning is cheap; the configuration and converters are shared.
///
/// # Example
///
/// ```
/// use oaigate::Gateway;
/// use oaigate_core::{BackendKind, RepositoryConfig};
///
/// let config = RepositoryConfig::new("https://library.example/oai", "admin@library.example");
/// let gateway = Gateway::new(config, BackendKind::SourceRecords).unwrap();
/// let tenant = gateway.tenant_context("diku");
/// assert_eq!(tenant.identifier_prefix(), "oai:library.example:diku/");
/// ```
#[derive(Clone, Debug)]
pub struct Gateway {
    config: Arc<RepositoryConfig>,
    adapter: StorageAdapter,
    converters: Arc<ConverterRegistry>,
    rules: ValidationRules,
}

impl Gateway {
    /// A gateway with the built-in converters.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: RepositoryConfig, backend: BackendKind) -> Result<Self> {
        Self::with_converters(config, backend, ConverterRegistry::with_defaults())
    }

    /// A gateway serving exactly the formats in `converters`.
    pub fn with_converters(
        config: RepositoryConfig,
        backend: BackendKind,
        converters: ConverterRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let rules = ValidationRules::new(converters.prefixes(), [SetSpec::all().spec]);
        Ok(Self {
            config: Arc::new(config),
            adapter: StorageAdapter::new(backend),
            converters: Arc::new(converters),
            rules,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn backend(&self) -> BackendKind {
        self.adapter.kind()
    }

    /// Tenant context under this repository's identifier namespace.
    pub fn tenant_context(&self, tenant: impl Into<String>) -> TenantContext {
        TenantContext::new(tenant, self.config.namespace())
    }

    /// Answer one request against `storage`.
    ///
    /// Protocol errors are part of the `Ok` response. `Err` means the backend
    /// or a conversion failed and the caller should answer 500.
    #[instrument(skip_all, fields(verb = %request.verb(), tenant = request.tenant().tenant()))]
    pub async fn handle(&self, storage: &dyn Storage, request: Request) -> Result<OaiResponse> {
        let ctx = HarvestContext {
            config: &self.config,
            adapter: &self.adapter,
            converters: &self.converters,
            rules: &self.rules,
            storage,
        };

        let result = match request.verb() {
            Verb::Identify => run(&IdentifyHandler, &ctx, request).await,
            Verb::ListMetadataFormats => run(&MetadataFormatsHandler, &ctx, request).await,
            Verb::ListSets => run(&SetsHandler, &ctx, request).await,
            Verb::ListIdentifiers => run(&ListHandler::identifiers(), &ctx, request).await,
            Verb::ListRecords => run(&ListHandler::records(), &ctx, request).await,
            Verb::GetRecord => run(&GetRecordHandler, &ctx, request).await,
        };

        if let Err(err) = &result {
            error!(error = %err, "request failed");
        }
        result
    }
}
