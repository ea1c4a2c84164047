//! Storage access shared by the verb handlers.

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use oaigate_core::{
    Header, ItemPage, MetadataConverter, Record, Request, Result, StorageBackend, StorageItem,
};

use crate::verbs::HarvestContext;

/// Fetch one listing page for `request`.
///
/// A 404 from the listing endpoint is an empty page.
#[instrument(skip(ctx, request), fields(verb = %request.verb(), offset = request.offset()))]
pub async fn list_page(ctx: &HarvestContext<'_>, request: &Request, limit: u64) -> Result<ItemPage> {
    let endpoint =
        ctx.adapter
            .build_list_endpoint(request, limit, ctx.config.skip_suppressed)?;
    debug!(%endpoint, "listing items");

    match ctx.storage.get_json(&endpoint).await? {
        Some(body) => ctx.adapter.parse_page(&body),
        None => Ok(ItemPage {
            items: Vec::new(),
            total_records: 0,
        }),
    }
}

/// Look up the item behind the request's identifier.
pub async fn lookup_item(ctx: &HarvestContext<'_>, request: &Request) -> Result<Option<StorageItem>> {
    let page = list_page(ctx, request, 1).await?;
    Ok(page.items.into_iter().next())
}

/// The raw metadata payload of one item. `None` means "not found".
///
/// A payload embedded in the listing is used as is.
pub async fn fetch_payload(ctx: &HarvestContext<'_>, item: &StorageItem) -> Result<Option<Value>> {
    if let Some(payload) = &item.payload {
        trace!(id = %item.id, "using inline payload");
        return Ok(Some(payload.clone()));
    }
    let endpoint = ctx.adapter.build_metadata_endpoint(&item.id);
    let body = ctx.storage.get_json(&endpoint).await?;
    Ok(body.and_then(|body| ctx.adapter.extract_metadata_payload(&body)))
}

async fn fetch_converted(
    ctx: &HarvestContext<'_>,
    converter: &dyn MetadataConverter,
    item: &StorageItem,
) -> Result<Option<String>> {
    match fetch_payload(ctx, item).await? {
        Some(payload) => Ok(Some(converter.convert(&payload)?)),
        None => Ok(None),
    }
}

/// Fetch and convert the metadata of every item concurrently.
///
/// Waits for every fetch to settle. Items whose metadata is not found are
/// dropped; the first other failure, in listing order, fails the whole call.
/// Surviving records keep the listing order.
#[instrument(skip_all, fields(items = items.len()))]
pub async fn fetch_records(
    ctx: &HarvestContext<'_>,
    request: &Request,
    converter: &dyn MetadataConverter,
    items: &[StorageItem],
) -> Result<Vec<Record>> {
    let results = join_all(
        items
            .iter()
            .map(|item| fetch_converted(ctx, converter, item)),
    )
    .await;

    let identifier_prefix = request.identifier_prefix();
    let mut records = Vec::with_capacity(items.len());
    for (item, result) in items.iter().zip(results) {
        match result? {
            Some(metadata) => records.push(Record {
                header: Header::for_item(&identifier_prefix, item),
                metadata,
            }),
            None => warn!(id = %item.id, "no metadata found, skipping record"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConverterRegistry, OAI_DC_PREFIX};
    use crate::verbs::testing::{FakeStorage, marc};
    use oaigate_core::{
        BackendKind, Error, RepositoryConfig, StorageAdapter, TenantContext, ValidationRules, Verb,
    };

    struct Fixture {
        config: RepositoryConfig,
        adapter: StorageAdapter,
        converters: ConverterRegistry,
        rules: ValidationRules,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: RepositoryConfig::new("http://localhost/oai", "admin@localhost"),
                adapter: StorageAdapter::new(BackendKind::Instances),
                converters: ConverterRegistry::with_defaults(),
                rules: ValidationRules::new(["oai_dc", "marc21"], ["all"]),
            }
        }

        fn ctx<'a>(&'a self, storage: &'a FakeStorage) -> HarvestContext<'a> {
            HarvestContext {
                config: &self.config,
                adapter: &self.adapter,
                converters: &self.converters,
                rules: &self.rules,
                storage,
            }
        }
    }

    fn metadata_endpoint(id: &str) -> String {
        format!("/instance-storage/instances/{}/source-record/marc-json", id)
    }

    fn request() -> Request {
        Request::builder(Verb::ListRecords, TenantContext::new("diku", "localhost"))
            .metadata_prefix(OAI_DC_PREFIX)
            .build()
    }

    #[tokio::test]
    async fn drops_missing_metadata_in_order() {
        let storage = FakeStorage::default()
            .with(metadata_endpoint("1"), marc("One"))
            .with(metadata_endpoint("2"), marc("Two"))
            .with(metadata_endpoint("4"), marc("Four"));
        let fixture = Fixture::new();
        let ctx = fixture.ctx(&storage);
        let items: Vec<_> = ["1", "2", "3", "4"].into_iter().map(StorageItem::new).collect();
        let converter = fixture.converters.get(OAI_DC_PREFIX).unwrap();

        let records = fetch_records(&ctx, &request(), converter, &items).await.unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.header.identifier.as_str()).collect();
        assert_eq!(
            ids,
            vec!["oai:localhost:diku/1", "oai:localhost:diku/2", "oai:localhost:diku/4"]
        );
        assert!(records[2].metadata.contains("<dc:title>Four</dc:title>"));
        assert_eq!(storage.call_count(), 4);
    }

    #[tokio::test]
    async fn backend_failure_fails_the_page() {
        let storage = FakeStorage::default()
            .with(metadata_endpoint("1"), marc("One"))
            .failing(metadata_endpoint("2"), 500);
        let fixture = Fixture::new();
        let ctx = fixture.ctx(&storage);
        let items: Vec<_> = ["1", "2"].into_iter().map(StorageItem::new).collect();
        let converter = fixture.converters.get(OAI_DC_PREFIX).unwrap();

        let err = fetch_records(&ctx, &request(), converter, &items)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[tokio::test]
    async fn missing_listing_is_empty_page() {
        let storage = FakeStorage::default();
        let fixture = Fixture::new();
        let page = list_page(&fixture.ctx(&storage), &request(), 10).await.unwrap();
        assert!(page.items.is_empty());
        assert!(storage.called("/instance-storage/instances?offset=0&limit=10"));
    }
}
