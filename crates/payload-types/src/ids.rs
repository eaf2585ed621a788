use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of a partition key, in bytes.
pub const MAX_PARTITION_KEY_LEN: usize = 1024;

/// Identifier of a stored payload.
///
/// Freshly allocated ids are time-ordered UUID v7 strings. Ids handed back by
/// a backing store are accepted as opaque non-empty strings, so a store that
/// allocates its own identifiers still round-trips.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadId(String);

impl PayloadId {
    /// Generate a new time-ordered payload ID (UUID v7).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier. Rejects empty or whitespace-only input.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(TypeError::InvalidPayloadId(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PayloadId({})", self.short_id())
    }
}

impl fmt::Display for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-chosen key used to co-locate payloads in the backing store.
///
/// Valid partition keys:
/// - Must be non-empty and not whitespace-only
/// - Must not contain control characters
/// - Must be at most [`MAX_PARTITION_KEY_LEN`] bytes
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(TypeError::InvalidPartitionKey {
                key,
                reason: "partition key must not be empty".into(),
            });
        }
        if key.len() > MAX_PARTITION_KEY_LEN {
            return Err(TypeError::InvalidPartitionKey {
                reason: format!(
                    "partition key is {} bytes, limit is {MAX_PARTITION_KEY_LEN}",
                    key.len()
                ),
                key,
            });
        }
        if let Some(ch) = key.chars().find(|c| c.is_control()) {
            return Err(TypeError::InvalidPartitionKey {
                key,
                reason: format!("contains control character: {ch:?}"),
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PartitionKey {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartitionKey> for String {
    fn from(key: PartitionKey) -> Self {
        key.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = PayloadId::generate();
        let b = PayloadId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_id_is_a_uuid() {
        let id = PayloadId::generate();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(PayloadId::parse("").is_err());
        assert!(PayloadId::parse("   ").is_err());
        assert_eq!(PayloadId::parse("p-1").unwrap().as_str(), "p-1");
    }

    #[test]
    fn short_id_handles_short_and_multibyte_ids() {
        assert_eq!(PayloadId::parse("abc").unwrap().short_id(), "abc");
        let id = PayloadId::parse("ääääääääää").unwrap();
        assert_eq!(id.short_id().chars().count(), 8);
    }

    #[test]
    fn payload_id_serializes_as_plain_string() {
        let id = PayloadId::parse("p-42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-42\"");
    }

    #[test]
    fn partition_key_rules() {
        assert!(PartitionKey::new("pk-1").is_ok());
        assert!(PartitionKey::new("tenant/eu-west").is_ok());
        assert!(PartitionKey::new("").is_err());
        assert!(PartitionKey::new(" \t").is_err());
        assert!(PartitionKey::new("bad\nkey").is_err());
        assert!(PartitionKey::new("x".repeat(MAX_PARTITION_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn partition_key_deserialization_validates() {
        let ok: PartitionKey = serde_json::from_str("\"pk-1\"").unwrap();
        assert_eq!(ok.as_str(), "pk-1");
        assert!(serde_json::from_str::<PartitionKey>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn printable_keys_are_accepted(key in "[a-zA-Z0-9_./-]{1,64}") {
            let parsed = PartitionKey::new(key.clone()).unwrap();
            prop_assert_eq!(parsed.as_str(), key.as_str());
        }
    }
}
