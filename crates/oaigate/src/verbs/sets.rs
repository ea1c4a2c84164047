//! ListSets.

use async_trait::async_trait;

use oaigate_core::{OaiError, Request, ResponseBody, Result, SetSpec, Verb};

use super::{HarvestContext, Outcome, Prepared, VerbHandler, reject_token};

/// The repository exposes a single set, `all`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SetsHandler;

#[async_trait]
impl VerbHandler for SetsHandler {
    type Fetched = ();

    fn verb(&self) -> Verb {
        Verb::ListSets
    }

    fn prepare(&self, _ctx: &HarvestContext<'_>, request: Request) -> Prepared {
        reject_token(request)
    }

    fn validate(&self, _ctx: &HarvestContext<'_>, _request: &Request) -> Vec<OaiError> {
        Vec::new()
    }

    async fn fetch(&self, _ctx: &HarvestContext<'_>, _request: &Request) -> Result<()> {
        Ok(())
    }

    fn assemble(&self, _ctx: &HarvestContext<'_>, _request: &Request, _fetched: ()) -> Outcome {
        Outcome::Body(ResponseBody::ListSets(vec![SetSpec::all()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::verbs::testing::FakeStorage;
    use oaigate_core::{BackendKind, ErrorCode, RepositoryConfig, TenantContext};

    fn gateway() -> Gateway {
        let config = RepositoryConfig::new("http://localhost/oai", "admin@localhost");
        Gateway::new(config, BackendKind::Instances).unwrap()
    }

    #[tokio::test]
    async fn lists_all() {
        let request = Request::builder(Verb::ListSets, TenantContext::new("diku", "localhost")).build();

        let response = gateway()
            .handle(&FakeStorage::default(), request)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            response.document.body,
            ResponseBody::ListSets(vec![SetSpec::all()])
        );
    }

    #[tokio::test]
    async fn token_is_bad_resumption_token() {
        let request = Request::builder(Verb::ListSets, TenantContext::new("diku", "localhost"))
            .resumption_token("bWV0YWRhdGFQcmVmaXg9b2FpX2Rj")
            .build();

        let response = gateway()
            .handle(&FakeStorage::default(), request)
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(
            response.document.errors()[0].code,
            ErrorCode::BadResumptionToken
        );
        assert_eq!(
            response.document.request.resumption_token.as_deref(),
            Some("bWV0YWRhdGFQcmVmaXg9b2FpX2Rj")
        );
    }
}
