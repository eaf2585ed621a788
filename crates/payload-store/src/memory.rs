//! In-memory payload store for testing and ephemeral use.
//!
//! [`InMemoryPayloadStore`] keeps every payload in a `HashMap` behind a
//! `RwLock`. Each operation takes the lock once, so batch appends are
//! applied atomically with respect to readers and other writers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use payload_types::{ContinuationToken, DataChunk};
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::key::{PayloadKey, PayloadRecord, ResourceKind};
use crate::token::{decode_offset, encode_offset};
use crate::traits::PayloadStore;

#[derive(Debug)]
struct PayloadEntry {
    record: PayloadRecord,
    slots: HashMap<ResourceKind, Value>,
    collections: HashMap<ResourceKind, Vec<Value>>,
}

impl PayloadEntry {
    fn new(record: PayloadRecord) -> Self {
        Self {
            record,
            slots: HashMap::new(),
            collections: HashMap::new(),
        }
    }
}

/// An in-memory implementation of [`PayloadStore`].
///
/// Data is lost when the store is dropped. `page_size` caps how many items a
/// single chunk may hold regardless of what the caller asks for, which lets
/// tests force multi-chunk reads.
///
/// The last chunk holding items carries no continuation token, so `n` items
/// at one item per chunk are read in exactly `n` calls. No trailing empty
/// chunk is ever produced; only an empty collection reads as one empty chunk.
#[derive(Debug)]
pub struct InMemoryPayloadStore {
    payloads: RwLock<HashMap<PayloadKey, PayloadEntry>>,
    page_size: Option<usize>,
    reachable: AtomicBool,
}

impl InMemoryPayloadStore {
    /// Create a new empty store with no page size cap.
    pub fn new() -> Self {
        Self {
            payloads: RwLock::new(HashMap::new()),
            page_size: None,
            reachable: AtomicBool::new(true),
        }
    }

    /// Create a store whose chunks hold at most `page_size` items.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size.max(1)),
            ..Self::new()
        }
    }

    /// Simulate losing (or regaining) connectivity. While unreachable every
    /// operation fails with [`StoreError::Unavailable`].
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of payloads currently stored.
    ///
    /// Diagnostic helpers read through a poisoned lock instead of failing.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if no payload has been created.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items in a payload's collection, or `None` if the payload is unknown.
    pub fn collection_len(&self, key: &PayloadKey, kind: ResourceKind) -> Option<usize> {
        let payloads = self.snapshot();
        let entry = payloads.get(key)?;
        Some(entry.collections.get(&kind).map(Vec::len).unwrap_or(0))
    }

    fn check_reachable(&self) -> StoreResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store marked unreachable".into()))
        }
    }

    fn snapshot(&self) -> RwLockReadGuard<'_, HashMap<PayloadKey, PayloadEntry>> {
        self.payloads.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<PayloadKey, PayloadEntry>>> {
        self.payloads
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<PayloadKey, PayloadEntry>>> {
        self.payloads
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryPayloadStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(key: &PayloadKey) -> StoreError {
    StoreError::NotFound {
        resource: "payload",
        id: key.to_string(),
    }
}

fn expect_slot(kind: ResourceKind) -> StoreResult<()> {
    if kind.is_collection() {
        return Err(StoreError::InvalidInput(format!("{kind} is a collection, not a slot")));
    }
    Ok(())
}

fn expect_collection(kind: ResourceKind) -> StoreResult<()> {
    if !kind.is_collection() {
        return Err(StoreError::InvalidInput(format!("{kind} is a slot, not a collection")));
    }
    Ok(())
}

#[async_trait]
impl PayloadStore for InMemoryPayloadStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_reachable()
    }

    async fn create_payload(
        &self,
        record: PayloadRecord,
        inline_data: Option<Value>,
    ) -> StoreResult<PayloadRecord> {
        self.check_reachable()?;
        let mut payloads = self.write_state()?;
        if payloads.contains_key(&record.key) {
            return Err(StoreError::Conflict(format!(
                "payload {} already exists",
                record.key
            )));
        }

        let mut entry = PayloadEntry::new(record.clone());
        if let Some(data) = inline_data {
            entry.slots.insert(ResourceKind::InlineData, data);
        }
        payloads.insert(record.key.clone(), entry);

        debug!(key = %record.key, category = %record.base.category, "payload created");
        Ok(record)
    }

    async fn get_payload(&self, key: &PayloadKey) -> StoreResult<Option<PayloadRecord>> {
        self.check_reachable()?;
        let payloads = self.read_state()?;
        Ok(payloads.get(key).map(|entry| entry.record.clone()))
    }

    async fn read_slot(&self, key: &PayloadKey, kind: ResourceKind) -> StoreResult<Option<Value>> {
        self.check_reachable()?;
        expect_slot(kind)?;
        let payloads = self.read_state()?;
        let entry = payloads.get(key).ok_or_else(|| not_found(key))?;
        Ok(entry.slots.get(&kind).cloned())
    }

    async fn write_slot(
        &self,
        key: &PayloadKey,
        kind: ResourceKind,
        value: Value,
    ) -> StoreResult<()> {
        self.check_reachable()?;
        expect_slot(kind)?;
        let mut payloads = self.write_state()?;
        let entry = payloads.get_mut(key).ok_or_else(|| not_found(key))?;
        entry.slots.insert(kind, value);
        entry.record.base.touch(Utc::now());
        debug!(%key, %kind, "slot written");
        Ok(())
    }

    async fn append_items(
        &self,
        key: &PayloadKey,
        kind: ResourceKind,
        items: Vec<Value>,
    ) -> StoreResult<()> {
        self.check_reachable()?;
        expect_collection(kind)?;
        let mut payloads = self.write_state()?;
        let entry = payloads.get_mut(key).ok_or_else(|| not_found(key))?;
        if items.is_empty() {
            return Ok(());
        }
        let count = items.len();
        entry.collections.entry(kind).or_default().extend(items);
        entry.record.base.touch(Utc::now());
        debug!(%key, %kind, count, "items appended");
        Ok(())
    }

    async fn read_chunk(
        &self,
        key: &PayloadKey,
        kind: ResourceKind,
        token: Option<&ContinuationToken>,
        max_items: usize,
    ) -> StoreResult<DataChunk<Value>> {
        self.check_reachable()?;
        expect_collection(kind)?;
        if max_items == 0 {
            return Err(StoreError::InvalidInput("max_items must be positive".into()));
        }

        let offset = match token.filter(|t| !t.is_empty()) {
            Some(token) => decode_offset(token)?,
            None => 0,
        };
        let limit = self.page_size.map_or(max_items, |cap| cap.min(max_items));

        let payloads = self.read_state()?;
        let entry = payloads.get(key).ok_or_else(|| not_found(key))?;
        let items = entry.collections.get(&kind).map(Vec::as_slice).unwrap_or(&[]);
        if offset > items.len() {
            return Err(StoreError::InvalidInput(format!(
                "continuation token points past the end of {kind}"
            )));
        }

        let end = (offset + limit).min(items.len());
        let next = (end < items.len()).then(|| encode_offset(end));
        debug!(%key, %kind, offset, returned = end - offset, more = next.is_some(), "chunk read");
        Ok(DataChunk::new(items[offset..end].to_vec(), next))
    }
}
