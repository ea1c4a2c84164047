//! Verb handlers and the pipeline that drives them.
//!
//! Every verb is a [`VerbHandler`]: it may rewrite the incoming request
//! (restoring a resumption token), validates it, fetches what it needs from
//! storage, and assembles either a verb body or a list of protocol errors.
//! [`run`] strings these steps together identically for all verbs and builds
//! the response envelope.

mod get_record;
mod identify;
mod list;
mod metadata_formats;
mod sets;

pub use get_record::GetRecordHandler;
pub use identify::IdentifyHandler;
pub use list::{ListFetched, ListHandler};
pub use metadata_formats::MetadataFormatsHandler;
pub use sets::SetsHandler;

use async_trait::async_trait;
use tracing::{debug, info};

use oaigate_core::{
    ErrorCode, OaiError, OaiPmh, RepositoryConfig, Request, RequestEcho, ResponseBody, Result,
    Storage, StorageAdapter, ValidationRules, Verb,
};

use crate::convert::ConverterRegistry;
use crate::gateway::OaiResponse;

/// Everything a handler may consult while serving one request.
#[derive(Clone, Copy)]
pub struct HarvestContext<'a> {
    pub config: &'a RepositoryConfig,
    pub adapter: &'a StorageAdapter,
    pub converters: &'a ConverterRegistry,
    pub rules: &'a ValidationRules,
    pub storage: &'a dyn Storage,
}

/// Result of [`VerbHandler::prepare`].
#[derive(Debug)]
pub enum Prepared {
    /// Continue with this request.
    Ready(Request),
    /// Answer immediately with these errors, echoing this request.
    Rejected(Request, Vec<OaiError>),
}

/// Result of [`VerbHandler::assemble`].
#[derive(Debug)]
pub enum Outcome {
    Body(ResponseBody),
    Errors(Vec<OaiError>),
}

/// One OAI-PMH verb.
#[async_trait]
pub trait VerbHandler: Send + Sync {
    /// What [`fetch`](Self::fetch) hands to [`assemble`](Self::assemble).
    type Fetched: Send;

    fn verb(&self) -> Verb;

    /// Rewrite the incoming request before validation.
    fn prepare(&self, _ctx: &HarvestContext<'_>, request: Request) -> Prepared {
        Prepared::Ready(request)
    }

    /// Protocol errors in the request's arguments. Never touches storage.
    fn validate(&self, ctx: &HarvestContext<'_>, request: &Request) -> Vec<OaiError>;

    /// Load what the response needs from storage.
    async fn fetch(&self, ctx: &HarvestContext<'_>, request: &Request) -> Result<Self::Fetched>;

    fn assemble(
        &self,
        ctx: &HarvestContext<'_>,
        request: &Request,
        fetched: Self::Fetched,
    ) -> Outcome;

    /// HTTP status for a response carrying `errors`.
    fn status_for(&self, errors: &[OaiError]) -> u16 {
        default_status(errors)
    }
}

/// badArgument or badResumptionToken: 400; cannotDisseminateFormat: 422;
/// anything else: 404.
pub fn default_status(errors: &[OaiError]) -> u16 {
    if contains(errors, ErrorCode::BadArgument) || contains(errors, ErrorCode::BadResumptionToken)
    {
        400
    } else if contains(errors, ErrorCode::CannotDisseminateFormat) {
        422
    } else {
        404
    }
}

pub(crate) fn contains(errors: &[OaiError], code: ErrorCode) -> bool {
    errors.iter().any(|e| e.code == code)
}

fn error_response<H: VerbHandler>(
    handler: &H,
    ctx: &HarvestContext<'_>,
    request: &Request,
    errors: Vec<OaiError>,
) -> OaiResponse {
    let status = handler.status_for(&errors);
    info!(
        verb = %handler.verb(),
        status,
        codes = ?errors.iter().map(|e| e.code.as_str()).collect::<Vec<_>>(),
        "request completed with errors"
    );
    let echo = RequestEcho::from_request(request, ctx.config.base_url.as_str());
    OaiResponse {
        status,
        document: OaiPmh::new(echo, ResponseBody::Errors(errors)),
    }
}

/// Drive `handler` through prepare, validate, fetch and assemble.
///
/// Protocol errors come back as an `Ok` response with a non-200 status;
/// `Err` is reserved for storage and conversion failures.
pub async fn run<H: VerbHandler>(
    handler: &H,
    ctx: &HarvestContext<'_>,
    request: Request,
) -> Result<OaiResponse> {
    let request = match handler.prepare(ctx, request) {
        Prepared::Ready(request) => request,
        Prepared::Rejected(request, errors) => {
            return Ok(error_response(handler, ctx, &request, errors));
        }
    };

    let errors = handler.validate(ctx, &request);
    if !errors.is_empty() {
        return Ok(error_response(handler, ctx, &request, errors));
    }

    let fetched = handler.fetch(ctx, &request).await?;

    match handler.assemble(ctx, &request, fetched) {
        Outcome::Body(body) => {
            debug!(verb = %handler.verb(), "request completed");
            let echo = RequestEcho::from_request(&request, ctx.config.base_url.as_str());
            Ok(OaiResponse {
                status: 200,
                document: OaiPmh::new(echo, body),
            })
        }
        Outcome::Errors(errors) => Ok(error_response(handler, ctx, &request, errors)),
    }
}

/// Handlers that refuse any resumption token.
pub(crate) fn reject_token(request: Request) -> Prepared {
    if request.resumption_token().is_some() {
        Prepared::Rejected(request, vec![OaiError::bad_resumption_token()])
    } else {
        Prepared::Ready(request)
    }
}
