//! Identify.

use async_trait::async_trait;

use oaigate_core::{Datestamp, Identify, OaiError, Request, ResponseBody, Result, Verb};

use super::{HarvestContext, Outcome, VerbHandler};

/// Describes the repository from configuration alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentifyHandler;

#[async_trait]
impl VerbHandler for IdentifyHandler {
    type Fetched = ();

    fn verb(&self) -> Verb {
        Verb::Identify
    }

    fn validate(&self, _ctx: &HarvestContext<'_>, _request: &Request) -> Vec<OaiError> {
        Vec::new()
    }

    async fn fetch(&self, _ctx: &HarvestContext<'_>, _request: &Request) -> Result<()> {
        Ok(())
    }

    fn assemble(&self, ctx: &HarvestContext<'_>, _request: &Request, _fetched: ()) -> Outcome {
        let config = ctx.config;
        Outcome::Body(ResponseBody::Identify(Identify {
            repository_name: config.name.clone(),
            base_url: config.base_url.clone(),
            protocol_version: config.protocol_version.clone(),
            admin_emails: config.admin_emails.clone(),
            earliest_datestamp: Datestamp::epoch(),
            deleted_record: config.deleted_records,
            granularity: config.granularity.clone(),
            compressions: config.compressions.clone(),
        }))
    }
}
