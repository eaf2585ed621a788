use async_trait::async_trait;
use payload_store::{PayloadKey, ResourceKind};
use payload_types::{ContinuationToken, DataChunk};
use serde_json::Value;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::pagination::{ChunkSource, PagedSequence};

/// Decodes one stored value. `Ok(None)` drops the value from the page.
pub(crate) type Decoder<T> = fn(Value) -> ClientResult<Option<T>>;

/// Chunk source reading one collection of one payload through the store.
pub(crate) struct CollectionSource<T> {
    ctx: ClientContext,
    key: PayloadKey,
    kind: ResourceKind,
    operation: &'static str,
    decode: Decoder<T>,
}

#[async_trait]
impl<T: Send + 'static> ChunkSource<T> for CollectionSource<T> {
    async fn fetch_chunk(&self, token: Option<ContinuationToken>) -> ClientResult<DataChunk<T>> {
        let page_size = self.ctx.config.page_size;
        let chunk = self
            .ctx
            .run(self.operation, async {
                let chunk = self
                    .ctx
                    .store
                    .read_chunk(&self.key, self.kind, token.as_ref(), page_size)
                    .await?;
                Ok::<_, ClientError>(chunk)
            })
            .await?;

        let (values, next) = chunk.into_parts();
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            if let Some(item) = (self.decode)(value)? {
                items.push(item);
            }
        }
        Ok(DataChunk::new(items, next))
    }
}

impl ClientContext {
    /// Paged read over a payload collection, honouring the configured chunk limit.
    pub(crate) fn paged<T: Send + 'static>(
        &self,
        key: &PayloadKey,
        kind: ResourceKind,
        operation: &'static str,
        decode: Decoder<T>,
    ) -> PagedSequence<T> {
        let source = CollectionSource {
            ctx: self.clone(),
            key: key.clone(),
            kind,
            operation,
            decode,
        };
        PagedSequence::new(std::sync::Arc::new(source)).with_max_chunks(self.config.max_chunks)
    }
}
