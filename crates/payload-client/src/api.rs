use std::fmt;
use std::sync::Arc;

use payload_store::{PayloadKey, PayloadRecord, PayloadStore};
use payload_types::{ItemWithPartition, PartitionKey, PayloadData, PayloadId, TypedMetadata};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::data::PayloadValue;
use crate::error::{ClientError, ClientResult};
use crate::metrics::{OperationMetrics, TracingMetrics};
use crate::payload::PayloadClient;

/// Entry point: creates payloads and hands out [`PayloadClient`]s.
#[derive(Clone)]
pub struct PayloadApiClient {
    ctx: ClientContext,
}

impl fmt::Debug for PayloadApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadApiClient")
            .field("config", &self.ctx.config)
            .finish_non_exhaustive()
    }
}

impl PayloadApiClient {
    /// Validate `config` and probe `store`, reporting timings through `tracing`.
    pub async fn connect(config: ClientConfig, store: Arc<dyn PayloadStore>) -> ClientResult<Self> {
        Self::connect_with_metrics(config, store, Arc::new(TracingMetrics)).await
    }

    pub async fn connect_with_metrics(
        config: ClientConfig,
        store: Arc<dyn PayloadStore>,
        metrics: Arc<dyn OperationMetrics>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let ctx = ClientContext::new(store, config, metrics);
        ctx.run("connect", async {
            ctx.store
                .ping()
                .await
                .map_err(ClientError::from_initialization)
        })
        .await?;

        info!(
            service_uri = %ctx.config.service_uri,
            page_size = ctx.config.page_size,
            "payload client connected"
        );
        Ok(Self { ctx })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.ctx.config
    }

    /// Token whose cancellation abandons every in-flight and future
    /// operation of this client and of the payload clients it created.
    pub fn cancellation_token(&self) -> &CancellationToken {
        self.ctx.cancellation_token()
    }

    /// Create an unpartitioned payload with no inline data.
    pub async fn create_payload<D: PayloadValue, M: TypedMetadata>(
        &self,
    ) -> ClientResult<PayloadClient<D, M>> {
        let key = PayloadKey::unpartitioned(PayloadId::generate());
        self.create("create_payload", key, None).await
    }

    /// Create a payload under `partition_key` with `data` in its inline slot.
    ///
    /// The payload and its data are written by a single store call, so a
    /// following `read_payload_data` on the returned client sees `data`.
    pub async fn create_payload_with_data_v2<D: PayloadValue, M: TypedMetadata>(
        &self,
        partition_key: &str,
        data: D,
    ) -> ClientResult<PayloadClient<D, M>> {
        self.create_with_data(partition_key, data, None).await
    }

    /// Like [`create_payload_with_data_v2`](Self::create_payload_with_data_v2),
    /// recording `provided_id` on the stored data envelope.
    pub async fn create_payload_with_data_v2_provided<D: PayloadValue, M: TypedMetadata>(
        &self,
        partition_key: &str,
        data: D,
        provided_id: &str,
    ) -> ClientResult<PayloadClient<D, M>> {
        self.create_with_data(partition_key, data, Some(provided_id))
            .await
    }

    /// Bind a client to an existing payload.
    pub async fn open_payload<D: PayloadValue, M: TypedMetadata>(
        &self,
        partition_key: Option<&str>,
        payload_id: &str,
    ) -> ClientResult<PayloadClient<D, M>> {
        let partition_key = partition_key.map(PartitionKey::new).transpose()?;
        let key = PayloadKey::new(partition_key, PayloadId::parse(payload_id)?);

        let record = self
            .ctx
            .run("open_payload", async {
                self.ctx
                    .store
                    .get_payload(&key)
                    .await?
                    .ok_or_else(|| ClientError::NotFound(format!("payload {key}")))
            })
            .await?;
        Ok(PayloadClient::new(
            self.ctx.child(),
            record.key,
            record.base.category,
        ))
    }

    async fn create_with_data<D: PayloadValue, M: TypedMetadata>(
        &self,
        partition_key: &str,
        data: D,
        provided_id: Option<&str>,
    ) -> ClientResult<PayloadClient<D, M>> {
        let item = ItemWithPartition::create(PartitionKey::new(partition_key)?, data);
        let key = PayloadKey::new(Some(item.partition_key), item.payload_id.clone());

        let mut envelope = PayloadData::new(item.payload_id, item.data);
        if let Some(provided_id) = provided_id {
            envelope = envelope.with_provided_id(provided_id);
        }
        let inline = serde_json::to_value(&envelope)?;
        self.create("create_payload_with_data_v2", key, Some(inline))
            .await
    }

    async fn create<D: PayloadValue, M: TypedMetadata>(
        &self,
        operation: &'static str,
        key: PayloadKey,
        inline_data: Option<Value>,
    ) -> ClientResult<PayloadClient<D, M>> {
        let record = PayloadRecord::new(key, self.ctx.config.default_category.clone());
        let record = self
            .ctx
            .run(operation, async {
                self.ctx
                    .store
                    .create_payload(record, inline_data)
                    .await
                    .map_err(ClientError::from_initialization)
            })
            .await?;

        info!(
            payload = %record.key,
            category = %record.base.category,
            "payload created"
        );
        Ok(PayloadClient::new(
            self.ctx.child(),
            record.key,
            record.base.category,
        ))
    }
}
