//! GetRecord.

use async_trait::async_trait;

use oaigate_core::{Header, OaiError, Record, Request, ResponseBody, Result, Verb};

use super::{HarvestContext, Outcome, VerbHandler};
use crate::fetch;

#[derive(Clone, Copy, Debug, Default)]
pub struct GetRecordHandler;

#[async_trait]
impl VerbHandler for GetRecordHandler {
    /// `None` when either the item or its metadata is missing.
    type Fetched = Option<Record>;

    fn verb(&self) -> Verb {
        Verb::GetRecord
    }

    fn validate(&self, ctx: &HarvestContext<'_>, request: &Request) -> Vec<OaiError> {
        ctx.rules.validate_get_record_request(request)
    }

    async fn fetch(&self, ctx: &HarvestContext<'_>, request: &Request) -> Result<Option<Record>> {
        let Some(item) = fetch::lookup_item(ctx, request).await? else {
            return Ok(None);
        };
        let Some(payload) = fetch::fetch_payload(ctx, &item).await? else {
            return Ok(None);
        };

        let prefix = request.metadata_prefix().unwrap_or_default();
        let converter = ctx.converters.require(prefix)?;
        Ok(Some(Record {
            header: Header::for_item(&request.identifier_prefix(), &item),
            metadata: converter.convert(&payload)?,
        }))
    }

    fn assemble(
        &self,
        _ctx: &HarvestContext<'_>,
        request: &Request,
        fetched: Option<Record>,
    ) -> Outcome {
        match fetched {
            Some(record) => Outcome::Body(ResponseBody::GetRecord(record)),
            None => Outcome::Errors(vec![OaiError::id_does_not_exist(
                request.identifier().unwrap_or_default(),
            )]),
        }
    }
}
