use payload_store::{PayloadKey, ResourceKind};
use payload_types::LocElementDataReferenceDescriptor;
use serde_json::Value;
use tracing::debug;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::pagination::PagedSequence;

/// Collection of descriptors pointing at externally stored localized content.
#[derive(Clone)]
pub struct DataReferencesClient {
    ctx: ClientContext,
    key: PayloadKey,
}

impl DataReferencesClient {
    pub(crate) fn new(ctx: ClientContext, key: PayloadKey) -> Self {
        Self { ctx, key }
    }

    /// Append `descriptors` as one atomic batch, keeping their order.
    pub async fn add_loc_element_data_references(
        &self,
        descriptors: Vec<LocElementDataReferenceDescriptor>,
    ) -> ClientResult<()> {
        if descriptors.is_empty() {
            return Ok(());
        }
        let batch = descriptors
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        let count = batch.len();

        self.ctx
            .run("add_loc_element_data_references", async {
                self.ctx
                    .store
                    .append_items(&self.key, ResourceKind::DataReferenceCollection, batch)
                    .await?;
                Ok::<_, ClientError>(())
            })
            .await?;
        debug!(payload = %self.key, count, "data references appended");
        Ok(())
    }

    /// Lazy, restartable read of every stored descriptor in store order.
    pub fn read_stored_loc_element_data_references(
        &self,
    ) -> PagedSequence<LocElementDataReferenceDescriptor> {
        self.ctx.paged(
            &self.key,
            ResourceKind::DataReferenceCollection,
            "read_stored_loc_element_data_references",
            decode_descriptor,
        )
    }
}

fn decode_descriptor(value: Value) -> ClientResult<Option<LocElementDataReferenceDescriptor>> {
    Ok(Some(serde_json::from_value(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{connect, descriptor, Review};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn references_round_trip_under_the_comparer() {
        let (api, _) = connect(2).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let client = payload.get_payload_data_references_client();

        let written: Vec<_> = (0..5).map(|i| descriptor(&format!("file-{i}.resx"))).collect();
        client
            .add_loc_element_data_references(written.clone())
            .await
            .unwrap();

        let read = client
            .read_stored_loc_element_data_references()
            .collect_all()
            .await
            .unwrap();
        assert_eq!(read.len(), written.len());
        for (a, b) in written.iter().zip(&read) {
            assert!(a.same_reference(b));
        }

        let written_keys: BTreeSet<_> = written.iter().map(|d| d.key()).collect();
        let read_keys: BTreeSet<_> = read.iter().map(|d| d.key()).collect();
        assert_eq!(written_keys, read_keys);
    }

    #[tokio::test]
    async fn fresh_payload_has_no_references() {
        let (api, _) = connect(4).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let read = payload
            .get_payload_data_references_client()
            .read_stored_loc_element_data_references()
            .collect_all()
            .await
            .unwrap();
        assert!(read.is_empty());
    }

    #[tokio::test]
    async fn failed_append_adds_nothing() {
        let (api, store) = connect(4).await;
        let payload = api.create_payload::<String, Review>().await.unwrap();
        let client = payload.get_payload_data_references_client();

        store.set_reachable(false);
        let err = client
            .add_loc_element_data_references(vec![descriptor("a"), descriptor("b")])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::TransientIo(_)));

        store.set_reachable(true);
        assert_eq!(
            store.collection_len(payload.key(), ResourceKind::DataReferenceCollection),
            Some(0)
        );
    }
}
