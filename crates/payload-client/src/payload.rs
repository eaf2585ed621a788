use std::marker::PhantomData;

use chrono::Utc;
use payload_store::{PayloadKey, PayloadRecord, ResourceKind};
use payload_types::{PartitionKey, PayloadId, PayloadWithMetadata, TypedMetadata};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::context::ClientContext;
use crate::data::{DataClient, PayloadValue};
use crate::error::{ClientError, ClientResult};
use crate::metadata::MetadataCollectionClient;
use crate::references::DataReferencesClient;

/// Handle bound to one payload.
///
/// Holds no state beyond the payload's address and a connection handle, so
/// clones are cheap and may be used concurrently.
pub struct PayloadClient<D, M> {
    ctx: ClientContext,
    key: PayloadKey,
    category: String,
    _types: PhantomData<fn() -> (D, M)>,
}

impl<D, M> Clone for PayloadClient<D, M> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            key: self.key.clone(),
            category: self.category.clone(),
            _types: PhantomData,
        }
    }
}

impl<D, M> std::fmt::Debug for PayloadClient<D, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadClient")
            .field("key", &self.key)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl<D: PayloadValue, M: TypedMetadata> PayloadClient<D, M> {
    pub(crate) fn new(ctx: ClientContext, key: PayloadKey, category: String) -> Self {
        Self {
            ctx,
            key,
            category,
            _types: PhantomData,
        }
    }

    pub fn payload_id(&self) -> &PayloadId {
        &self.key.payload_id
    }

    pub fn partition_key(&self) -> Option<&PartitionKey> {
        self.key.partition_key.as_ref()
    }

    pub fn key(&self) -> &PayloadKey {
        &self.key
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        self.ctx.cancellation_token()
    }

    /// A clone whose operations, and those of every sub-client it hands out,
    /// are abandoned with [`ClientError::Cancelled`] once `cancel` fires.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            ctx: self.ctx.with_cancellation(cancel),
            ..self.clone()
        }
    }

    pub fn get_payload_data_client(&self) -> DataClient<D> {
        DataClient::new(self.ctx.child(), self.key.clone())
    }

    pub fn get_payload_metadata_collection_client(&self) -> MetadataCollectionClient<M> {
        self.metadata_collection_client::<M>()
    }

    /// Metadata collection view for a metadata type other than `M`.
    pub fn metadata_collection_client<T: TypedMetadata>(&self) -> MetadataCollectionClient<T> {
        MetadataCollectionClient::new(self.ctx.child(), self.key.clone(), self.category.clone())
    }

    pub fn get_payload_data_references_client(&self) -> DataReferencesClient {
        DataReferencesClient::new(self.ctx.child(), self.key.clone())
    }

    /// Current header of the payload as the store sees it.
    pub async fn payload(&self) -> ClientResult<PayloadRecord> {
        self.ctx
            .run("get_payload", async { self.fetch_record().await })
            .await
    }

    /// Replace the inline metadata slot. Last write wins.
    pub async fn update_payload_inline_metadata(&self, metadata: M) -> ClientResult<()> {
        self.ctx
            .run("update_payload_inline_metadata", async {
                let mut base = self.fetch_record().await?.base;
                base.touch(Utc::now());
                let envelope = PayloadWithMetadata::new(base, metadata);
                let value = serde_json::to_value(&envelope)?;
                self.ctx
                    .store
                    .write_slot(&self.key, ResourceKind::InlineMetadata, value)
                    .await?;
                Ok::<_, ClientError>(())
            })
            .await?;
        debug!(payload = %self.key, metadata_type = M::METADATA_TYPE, "inline metadata replaced");
        Ok(())
    }

    /// Current inline metadata envelope, or `None` if it was never written.
    pub async fn get_payload_inline_metadata(
        &self,
    ) -> ClientResult<Option<PayloadWithMetadata<M>>> {
        self.ctx
            .run("get_payload_inline_metadata", async {
                let value = self
                    .ctx
                    .store
                    .read_slot(&self.key, ResourceKind::InlineMetadata)
                    .await?;
                // Deserialization rejects an envelope tagged with another type.
                let envelope = value
                    .map(serde_json::from_value::<PayloadWithMetadata<M>>)
                    .transpose()?;
                Ok::<_, ClientError>(envelope)
            })
            .await
    }

    /// Write `items` to the metadata collection as one atomic batch.
    pub async fn upload_payload_metadata(&self, items: Vec<M>) -> ClientResult<()> {
        self.get_payload_metadata_collection_client()
            .add_payload_metadata_collection_items(items)
            .await
    }

    /// Read the whole metadata collection, in store order.
    ///
    /// Timed as one operation; the chunk fetches underneath are timed too.
    pub async fn get_payload_metadata(&self) -> ClientResult<Vec<M>> {
        let items = self
            .get_payload_metadata_collection_client()
            .read_payload_metadata_collection();
        self.ctx
            .run("get_payload_metadata", items.collect_all())
            .await
    }

    async fn fetch_record(&self) -> ClientResult<PayloadRecord> {
        self.ctx
            .store
            .get_payload(&self.key)
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("payload {}", self.key)))
    }

    #[cfg(test)]
    pub(crate) fn context(&self) -> &ClientContext {
        &self.ctx
    }
}
