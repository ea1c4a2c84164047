//! ListMetadataFormats.

use async_trait::async_trait;

use oaigate_core::{
    ErrorCode, MetadataFormat, OaiError, Request, ResponseBody, Result, Verb, validate_identifier,
};

use super::{HarvestContext, Outcome, Prepared, VerbHandler, contains, default_status, reject_token};
use crate::fetch;

#[derive(Clone, Copy, Debug, Default)]
pub struct MetadataFormatsHandler;

#[async_trait]
impl VerbHandler for MetadataFormatsHandler {
    /// `false` when the named item does not exist.
    type Fetched = bool;

    fn verb(&self) -> Verb {
        Verb::ListMetadataFormats
    }

    fn prepare(&self, _ctx: &HarvestContext<'_>, request: Request) -> Prepared {
        reject_token(request)
    }

    fn validate(&self, _ctx: &HarvestContext<'_>, request: &Request) -> Vec<OaiError> {
        match request.identifier() {
            Some(identifier) if !validate_identifier(request) => {
                vec![OaiError::bad_identifier(identifier)]
            }
            _ => Vec::new(),
        }
    }

    async fn fetch(&self, ctx: &HarvestContext<'_>, request: &Request) -> Result<bool> {
        if request.identifier().is_none() {
            return Ok(true);
        }
        Ok(fetch::lookup_item(ctx, request).await?.is_some())
    }

    fn assemble(&self, ctx: &HarvestContext<'_>, request: &Request, exists: bool) -> Outcome {
        if !exists {
            return Outcome::Errors(vec![OaiError::id_does_not_exist(
                request.identifier().unwrap_or_default(),
            )]);
        }
        let formats: Vec<MetadataFormat> = ctx.converters.formats();
        Outcome::Body(ResponseBody::ListMetadataFormats(formats))
    }

    /// A malformed identifier is answered with 422 here.
    fn status_for(&self, errors: &[OaiError]) -> u16 {
        if contains(errors, ErrorCode::BadArgument) {
            422
        } else {
            default_status(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::verbs::testing::FakeStorage;
    use oaigate_core::{BackendKind, RepositoryConfig, TenantContext};
    use serde_json::json;

    fn gateway() -> Gateway {
        let config = RepositoryConfig::new("http://localhost/oai", "admin@localhost");
        Gateway::new(config, BackendKind::SourceRecords).unwrap()
    }

    fn builder() -> oaigate_core::RequestBuilder {
        Request::builder(
            Verb::ListMetadataFormats,
            TenantContext::new("diku", "localhost"),
        )
    }

    #[tokio::test]
    async fn lists_registered_formats() {
        let storage = FakeStorage::default();

        let response = gateway().handle(&storage, builder().build()).await.unwrap();

        assert_eq!(response.status, 200);
        let ResponseBody::ListMetadataFormats(formats) = &response.document.body else {
            panic!("unexpected body {:?}", response.document.body);
        };
        let prefixes: Vec<_> = formats.iter().map(|f| f.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["oai_dc", "marc21"]);
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn existing_identifier() {
        let storage = FakeStorage::default().with(
            "/source-storage/result?query=recordType%3D%3DMARC+and+recordId%3D%3Dabc&offset=0&limit=1",
            json!({"results": [{"recordId": "abc"}], "totalRecords": 1}),
        );
        let request = builder().identifier("oai:localhost:diku/abc").build();

        let response = gateway().handle(&storage, request).await.unwrap();

        assert_eq!(response.status, 200, "{:?}", response.document.body);
    }

    #[tokio::test]
    async fn unknown_identifier() {
        let storage = FakeStorage::default();
        let request = builder().identifier("oai:localhost:diku/abc").build();

        let response = gateway().handle(&storage, request).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.document.errors()[0].code, ErrorCode::IdDoesNotExist);
    }

    #[tokio::test]
    async fn malformed_identifier_is_422() {
        let storage = FakeStorage::default();
        let request = builder().identifier("abc").build();

        let response = gateway().handle(&storage, request).await.unwrap();

        assert_eq!(response.status, 422);
        assert_eq!(response.document.errors()[0].code, ErrorCode::BadArgument);
    }

    #[tokio::test]
    async fn token_is_rejected() {
        let storage = FakeStorage::default();
        let request = builder().resumption_token("abc").build();

        let response = gateway().handle(&storage, request).await.unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(
            response.document.errors()[0].code,
            ErrorCode::BadResumptionToken
        );
    }
}
