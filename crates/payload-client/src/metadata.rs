use std::marker::PhantomData;

use payload_store::{PayloadKey, ResourceKind};
use payload_types::{PayloadMetadata, TypedMetadata};
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::pagination::PagedSequence;

/// Append-only metadata collection of one payload.
///
/// A collection may hold several metadata shapes. Reads through a
/// `MetadataCollectionClient<M>` only yield items tagged with
/// `M::METADATA_TYPE`; everything else is skipped.
pub struct MetadataCollectionClient<M> {
    ctx: ClientContext,
    key: PayloadKey,
    category: String,
    _metadata: PhantomData<fn() -> M>,
}

impl<M> Clone for MetadataCollectionClient<M> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            key: self.key.clone(),
            category: self.category.clone(),
            _metadata: PhantomData,
        }
    }
}

impl<M: TypedMetadata> MetadataCollectionClient<M> {
    pub(crate) fn new(ctx: ClientContext, key: PayloadKey, category: String) -> Self {
        Self {
            ctx,
            key,
            category,
            _metadata: PhantomData,
        }
    }

    /// Append `items` as one atomic batch, keeping their order.
    ///
    /// Every item is encoded before the store is called, so an item that
    /// fails to serialize aborts the whole batch. An empty batch succeeds
    /// without touching the store.
    pub async fn add_payload_metadata_collection_items(&self, items: Vec<M>) -> ClientResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let batch = items
            .into_iter()
            .map(|metadata| {
                let payload_id = self.key.payload_id.clone();
                let entry = PayloadMetadata::new(payload_id, self.category.as_str(), metadata);
                serde_json::to_value(&entry)
            })
            .collect::<Result<Vec<Value>, _>>()?;
        let count = batch.len();

        self.ctx
            .run("add_payload_metadata_collection_items", async {
                self.ctx
                    .store
                    .append_items(&self.key, ResourceKind::MetadataCollection, batch)
                    .await?;
                Ok::<_, ClientError>(())
            })
            .await?;
        debug!(payload = %self.key, count, metadata_type = M::METADATA_TYPE, "metadata appended");
        Ok(())
    }

    /// Lazy, restartable read of the metadata values in store order.
    pub fn read_payload_metadata_collection(&self) -> PagedSequence<M> {
        self.ctx.paged(
            &self.key,
            ResourceKind::MetadataCollection,
            "read_payload_metadata_collection",
            decode_metadata::<M>,
        )
    }

    /// Like [`read_payload_metadata_collection`](Self::read_payload_metadata_collection),
    /// but yields the full envelopes with ids and timestamps.
    pub fn read_payload_metadata_collection_entries(&self) -> PagedSequence<PayloadMetadata<M>> {
        self.ctx.paged(
            &self.key,
            ResourceKind::MetadataCollection,
            "read_payload_metadata_collection",
            decode_entry::<M>,
        )
    }
}

fn decode_entry<M: TypedMetadata>(value: Value) -> ClientResult<Option<PayloadMetadata<M>>> {
    let raw: PayloadMetadata<Value> = serde_json::from_value(value)?;
    if !raw.is::<M>() {
        trace!(
            expected = M::METADATA_TYPE,
            found = raw.metadata_type(),
            "skipping metadata of another type"
        );
        return Ok(None);
    }
    Ok(Some(raw.decode::<M>()?))
}

fn decode_metadata<M: TypedMetadata>(value: Value) -> ClientResult<Option<M>> {
    Ok(decode_entry::<M>(value)?.map(|entry| entry.metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{connect, Label, Review};
    use payload_types::PayloadId;

    #[tokio::test]
    async fn appended_items_read_back_in_order_for_any_page_size() {
        for page_size in [1, 2, 3, 7, 100] {
            let (api, _) = connect(page_size).await;
            let payload = api.create_payload::<String, Review>().await.unwrap();
            let client = payload.get_payload_metadata_collection_client();

            let reviews: Vec<Review> = (1..=7).map(Review::scored).collect();
            client
                .add_payload_metadata_collection_items(reviews[..3].to_vec())
                .await
                .unwrap();
            client
                .add_payload_metadata_collection_items(reviews[3..].to_vec())
                .await
                .unwrap();

            let read = client.read_payload_metadata_collection().collect_all().await.unwrap();
            assert_eq!(read, reviews, "page_size {page_size}");
        }
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let (api, store) = connect(10).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let client = payload.get_payload_metadata_collection_client();
        client.add_payload_metadata_collection_items(vec![]).await.unwrap();

        assert_eq!(
            store.collection_len(payload.key(), ResourceKind::MetadataCollection),
            Some(0)
        );
    }

    #[tokio::test]
    async fn heterogeneous_collection_is_filtered_by_type() {
        let (api, _) = connect(2).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let reviews = payload.get_payload_metadata_collection_client();
        let labels = payload.metadata_collection_client::<Label>();

        reviews
            .add_payload_metadata_collection_items(vec![Review::scored(1)])
            .await
            .unwrap();
        labels
            .add_payload_metadata_collection_items(vec![Label::new("a"), Label::new("b")])
            .await
            .unwrap();
        reviews
            .add_payload_metadata_collection_items(vec![Review::scored(2)])
            .await
            .unwrap();

        let read_reviews = reviews.read_payload_metadata_collection().collect_all().await.unwrap();
        assert_eq!(read_reviews, vec![Review::scored(1), Review::scored(2)]);

        let read_labels = labels.read_payload_metadata_collection().collect_all().await.unwrap();
        assert_eq!(read_labels, vec![Label::new("a"), Label::new("b")]);
    }

    #[tokio::test]
    async fn entries_carry_payload_id_and_tag() {
        let (api, _) = connect(10).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let client = payload.get_payload_metadata_collection_client();
        client
            .add_payload_metadata_collection_items(vec![Review::scored(5)])
            .await
            .unwrap();

        let entries = client
            .read_payload_metadata_collection_entries()
            .collect_all()
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(&entries[0].payload_id, payload.payload_id());
        assert_eq!(entries[0].metadata_type(), Review::METADATA_TYPE);
        assert_eq!(entries[0].base.category, "default");
    }

    #[tokio::test]
    async fn unknown_payload_fails_on_read() {
        let (api, _) = connect(10).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let stray = MetadataCollectionClient::<Review>::new(
            payload.context().clone(),
            PayloadKey::unpartitioned(PayloadId::generate()),
            "default".into(),
        );
        let err = stray
            .read_payload_metadata_collection()
            .collect_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[test]
    fn decode_skips_foreign_tags_and_rejects_garbage() {
        let entry = PayloadMetadata::new(PayloadId::generate(), "c", Label::new("x"));
        let value = serde_json::to_value(&entry).unwrap();
        assert!(decode_metadata::<Review>(value.clone()).unwrap().is_none());
        assert_eq!(decode_metadata::<Label>(value).unwrap(), Some(Label::new("x")));

        let err = decode_metadata::<Label>(serde_json::json!({"not": "metadata"})).unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }
}
