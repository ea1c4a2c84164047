//! ListRecords and ListIdentifiers.

use async_trait::async_trait;
use tracing::{debug, warn};

use oaigate_core::{
    Header, ItemPage, OaiError, Record, Request, ResponseBody, Result,
    ResumptionTokenInfo, Verb, can_resume, next_token, restore_request,
};

use super::{HarvestContext, Outcome, Prepared, VerbHandler};
use crate::fetch;

/// Serves both list verbs; they differ only in whether metadata is fetched.
#[derive(Clone, Copy, Debug)]
pub struct ListHandler {
    verb: Verb,
}

impl ListHandler {
    pub fn records() -> Self {
        Self {
            verb: Verb::ListRecords,
        }
    }

    pub fn identifiers() -> Self {
        Self {
            verb: Verb::ListIdentifiers,
        }
    }

    fn with_records(&self) -> bool {
        self.verb == Verb::ListRecords
    }
}

/// What a list fetch found.
#[derive(Debug)]
pub enum ListFetched {
    /// The result set changed under a resumed harvest.
    Drifted,
    /// A fresh harvest matched nothing.
    NoRecords,
    Headers(ItemPage),
    Records { page: ItemPage, records: Vec<Record> },
}

impl ListHandler {
    fn token_info(
        &self,
        ctx: &HarvestContext<'_>,
        request: &Request,
        page: &ItemPage,
    ) -> Option<ResumptionTokenInfo> {
        let outcome = next_token(
            request,
            &page.items,
            page.total_records,
            ctx.config.max_records_per_response,
        );
        outcome.value().map(|value| ResumptionTokenInfo {
            value: value.to_string(),
            complete_list_size: page.total_records,
            cursor: request.offset(),
        })
    }
}

#[async_trait]
impl VerbHandler for ListHandler {
    type Fetched = ListFetched;

    fn verb(&self) -> Verb {
        self.verb
    }

    fn prepare(&self, _ctx: &HarvestContext<'_>, request: Request) -> Prepared {
        if request.resumption_token().is_none() || request.has_harvest_arguments() {
            return Prepared::Ready(request);
        }
        match restore_request(&request) {
            Ok(restored) => {
                debug!(offset = restored.offset(), "resuming harvest");
                Prepared::Ready(restored)
            }
            Err(err) => {
                debug!(error = %err, "unreadable resumption token");
                Prepared::Rejected(request, vec![OaiError::bad_resumption_token()])
            }
        }
    }

    fn validate(&self, ctx: &HarvestContext<'_>, request: &Request) -> Vec<OaiError> {
        ctx.rules.validate_list_request(request)
    }

    async fn fetch(&self, ctx: &HarvestContext<'_>, request: &Request) -> Result<ListFetched> {
        let page = fetch::list_page(ctx, request, ctx.config.max_records_per_response).await?;

        if request.is_restored() {
            if !can_resume(request, page.total_records, &page.items) {
                warn!(
                    previous_total = request.total_records(),
                    total = page.total_records,
                    "result set changed during harvest"
                );
                return Ok(ListFetched::Drifted);
            }
        } else if page.items.is_empty() {
            return Ok(ListFetched::NoRecords);
        }

        if !self.with_records() {
            return Ok(ListFetched::Headers(page));
        }

        let prefix = request.metadata_prefix().unwrap_or_default();
        let converter = ctx.converters.require(prefix)?;
        let records = fetch::fetch_records(ctx, request, converter, &page.items).await?;
        Ok(ListFetched::Records { page, records })
    }

    fn assemble(&self, ctx: &HarvestContext<'_>, request: &Request, fetched: ListFetched) -> Outcome {
        match fetched {
            ListFetched::Drifted => Outcome::Errors(vec![OaiError::resumption_flow_broken()]),
            ListFetched::NoRecords => Outcome::Errors(vec![OaiError::no_records_match()]),
            ListFetched::Headers(page) => {
                let resumption_token = self.token_info(ctx, request, &page);
                let prefix = request.identifier_prefix();
                let headers = page
                    .items
                    .iter()
                    .map(|item| Header::for_item(&prefix, item))
                    .collect();
                Outcome::Body(ResponseBody::ListIdentifiers {
                    headers,
                    resumption_token,
                })
            }
            ListFetched::Records { page, records } => Outcome::Body(ResponseBody::ListRecords {
                resumption_token: self.token_info(ctx, request, &page),
                records,
            }),
        }
    }
}
