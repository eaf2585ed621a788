use std::fmt;

use payload_types::{PartitionKey, PayloadBase, PayloadId};
use serde::{Deserialize, Serialize};

/// Address of a payload in the backing store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayloadKey {
    pub partition_key: Option<PartitionKey>,
    pub payload_id: PayloadId,
}

impl PayloadKey {
    pub fn new(partition_key: Option<PartitionKey>, payload_id: PayloadId) -> Self {
        Self {
            partition_key,
            payload_id,
        }
    }

    pub fn unpartitioned(payload_id: PayloadId) -> Self {
        Self::new(None, payload_id)
    }
}

impl fmt::Display for PayloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.partition_key {
            Some(pk) => write!(f, "{pk}/{}", self.payload_id),
            None => write!(f, "{}", self.payload_id),
        }
    }
}

/// A sub-resource of a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    InlineData,
    InlineMetadata,
    MetadataCollection,
    DataReferenceCollection,
}

impl ResourceKind {
    /// Slots hold one value; collections hold an append-only sequence.
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            ResourceKind::MetadataCollection | ResourceKind::DataReferenceCollection
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::InlineData => "inline-data",
            ResourceKind::InlineMetadata => "inline-metadata",
            ResourceKind::MetadataCollection => "metadata-collection",
            ResourceKind::DataReferenceCollection => "data-reference-collection",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored header of a payload: its address plus base fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRecord {
    pub key: PayloadKey,
    pub base: PayloadBase,
}

impl PayloadRecord {
    /// A fresh record for `key`, stamped with the current time.
    pub fn new(key: PayloadKey, category: impl Into<String>) -> Self {
        let base = PayloadBase::new(key.payload_id.as_str(), category);
        Self { key, base }
    }
}
