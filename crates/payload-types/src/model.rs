use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PartitionKey, PayloadId};

/// Identity, classification, and timestamps shared by payload envelopes.
///
/// Envelopes embed this struct (flattened on the wire) rather than being
/// stored as a bare `PayloadBase`. `updated_time` never moves backwards and
/// never precedes `created_time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBase {
    pub id: String,
    pub category: String,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl PayloadBase {
    /// Create a base stamped with the current time.
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self::at(id, category, Utc::now())
    }

    /// Create a base with an explicit creation time.
    pub fn at(id: impl Into<String>, category: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            created_time: now,
            updated_time: now,
        }
    }

    /// Advance `updated_time` to `now`, keeping it monotonically non-decreasing.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_time {
            self.updated_time = now;
        }
    }
}

/// The single inline data slot of a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadData<T> {
    pub id: String,
    pub payload_id: PayloadId,
    /// Caller-supplied correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_id: Option<String>,
    pub data: T,
}

impl<T> PayloadData<T> {
    pub fn new(payload_id: PayloadId, data: T) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            payload_id,
            provided_id: None,
            data,
        }
    }

    pub fn with_provided_id(mut self, provided_id: impl Into<String>) -> Self {
        self.provided_id = Some(provided_id.into());
        self
    }
}

/// A value stamped with a freshly generated payload id and a partition key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWithPartition<T> {
    pub payload_id: PayloadId,
    pub partition_key: PartitionKey,
    pub data: T,
}

impl<T> ItemWithPartition<T> {
    /// Wrap `data` under `partition_key` with a new payload id.
    pub fn create(partition_key: PartitionKey, data: T) -> Self {
        Self {
            payload_id: PayloadId::generate(),
            partition_key,
            data,
        }
    }
}
