use async_trait::async_trait;
use payload_types::{ContinuationToken, DataChunk};
use serde_json::Value;

use crate::error::StoreResult;
use crate::key::{PayloadKey, PayloadRecord, ResourceKind};

/// Remote store holding payloads and their sub-resources.
///
/// All implementations must satisfy these invariants:
/// - A payload key is unique; `create_payload` on an existing key is a
///   [`Conflict`](crate::StoreError::Conflict), never an overwrite.
/// - Slot writes replace the previous value and advance the payload's
///   `updated_time`.
/// - `append_items` is all-or-nothing: either every item becomes visible to
///   later reads, contiguously and in the given order, or none does.
/// - A chunk carrying a continuation token is followed by at least one more
///   chunk. Chunks may be empty while still carrying a token.
/// - Values are opaque JSON; the store never interprets them.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Probe that the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Create a payload, optionally filling its inline data slot in the same call.
    async fn create_payload(
        &self,
        record: PayloadRecord,
        inline_data: Option<Value>,
    ) -> StoreResult<PayloadRecord>;

    /// Read a payload header. Returns `Ok(None)` if the payload does not exist.
    async fn get_payload(&self, key: &PayloadKey) -> StoreResult<Option<PayloadRecord>>;

    /// Read a single-valued slot. Returns `Ok(None)` if it was never written.
    async fn read_slot(&self, key: &PayloadKey, kind: ResourceKind) -> StoreResult<Option<Value>>;

    /// Replace the value of a single-valued slot.
    async fn write_slot(&self, key: &PayloadKey, kind: ResourceKind, value: Value)
        -> StoreResult<()>;

    /// Atomically append a batch of items to a collection.
    async fn append_items(
        &self,
        key: &PayloadKey,
        kind: ResourceKind,
        items: Vec<Value>,
    ) -> StoreResult<()>;

    /// Read one chunk of a collection, starting at `token` (or the beginning).
    ///
    /// `max_items` is an upper bound; backends may return fewer.
    async fn read_chunk(
        &self,
        key: &PayloadKey,
        kind: ResourceKind,
        token: Option<&ContinuationToken>,
        max_items: usize,
    ) -> StoreResult<DataChunk<Value>>;
}
