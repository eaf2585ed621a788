use std::marker::PhantomData;

use payload_store::{PayloadKey, ResourceKind};
use payload_types::PayloadData;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};

/// A value that can live in a payload's inline data slot.
pub trait PayloadValue: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> PayloadValue for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Reader for a payload's inline data slot.
///
/// The slot is written when the payload is created; there is no separate
/// update path.
pub struct DataClient<D> {
    ctx: ClientContext,
    key: PayloadKey,
    _data: PhantomData<fn() -> D>,
}

impl<D> Clone for DataClient<D> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            key: self.key.clone(),
            _data: PhantomData,
        }
    }
}

impl<D: PayloadValue> DataClient<D> {
    pub(crate) fn new(ctx: ClientContext, key: PayloadKey) -> Self {
        Self {
            ctx,
            key,
            _data: PhantomData,
        }
    }

    /// Current inline data value. [`ClientError::NotFound`] if never written.
    pub async fn read_payload_data(&self) -> ClientResult<D> {
        Ok(self.read_payload_data_record().await?.data)
    }

    /// The full inline data envelope, including its ids.
    pub async fn read_payload_data_record(&self) -> ClientResult<PayloadData<D>> {
        self.ctx
            .run("read_payload_data", async {
                let value = self
                    .ctx
                    .store
                    .read_slot(&self.key, ResourceKind::InlineData)
                    .await?
                    .ok_or_else(|| {
                        ClientError::NotFound(format!("inline data of payload {}", self.key))
                    })?;
                Ok::<_, ClientError>(serde_json::from_value(value)?)
            })
            .await
    }
}
