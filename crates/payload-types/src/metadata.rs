//! Typed metadata envelopes.
//!
//! A metadata value carries a discriminator tag (`metadata_type`) so that a
//! collection holding several metadata shapes can be decoded item by item.
//! The tag comes from [`TypedMetadata::METADATA_TYPE`], fixed where the type
//! is declared; envelopes copy it at construction and expose it read-only.
//! Deserializing an envelope into a typed value checks the tag first, so a
//! `PayloadMetadata<T>` always holds a `T` written as `T`.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::ids::PayloadId;
use crate::model::PayloadBase;

/// A metadata shape that can be stored against a payload.
pub trait TypedMetadata: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Discriminator stored alongside every value of this type.
    const METADATA_TYPE: &'static str;
}

/// A type an envelope's `metadata` can be read into.
///
/// Implemented for every [`TypedMetadata`], accepting only its own tag, and
/// for [`serde_json::Value`], accepting any tag.
pub trait MetadataSlot: DeserializeOwned {
    fn accepts_tag(tag: &str) -> bool;
}

impl<T: TypedMetadata> MetadataSlot for T {
    fn accepts_tag(tag: &str) -> bool {
        tag == T::METADATA_TYPE
    }
}

impl MetadataSlot for Value {
    fn accepts_tag(_: &str) -> bool {
        true
    }
}

fn read_metadata<T: MetadataSlot, E: de::Error>(tag: &str, metadata: Value) -> Result<T, E> {
    if !T::accepts_tag(tag) {
        return Err(E::custom(format!(
            "metadata of type {tag} does not match the requested type"
        )));
    }
    serde_json::from_value(metadata).map_err(E::custom)
}

/// One item of a payload's metadata collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PayloadMetadata<T> {
    #[serde(flatten)]
    pub base: PayloadBase,
    pub payload_id: PayloadId,
    metadata_type: String,
    pub metadata: T,
}

impl<T: TypedMetadata> PayloadMetadata<T> {
    pub fn new(payload_id: PayloadId, category: impl Into<String>, metadata: T) -> Self {
        Self {
            base: PayloadBase::new(uuid::Uuid::now_v7().to_string(), category),
            payload_id,
            metadata_type: T::METADATA_TYPE.to_string(),
            metadata,
        }
    }

    /// Erase the metadata type, keeping the tag.
    pub fn to_untyped(&self) -> Result<PayloadMetadata<serde_json::Value>, TypeError> {
        Ok(PayloadMetadata {
            base: self.base.clone(),
            payload_id: self.payload_id.clone(),
            metadata_type: self.metadata_type.clone(),
            metadata: serde_json::to_value(&self.metadata)
                .map_err(|e| TypeError::Serialization(e.to_string()))?,
        })
    }
}

impl<T> PayloadMetadata<T> {
    pub fn metadata_type(&self) -> &str {
        &self.metadata_type
    }

    /// Returns `true` if this item was written as metadata type `U`.
    pub fn is<U: TypedMetadata>(&self) -> bool {
        self.metadata_type == U::METADATA_TYPE
    }
}

impl PayloadMetadata<serde_json::Value> {
    /// Decode the raw metadata into `U`, checking the discriminator first.
    pub fn decode<U: TypedMetadata>(self) -> Result<PayloadMetadata<U>, TypeError> {
        if !self.is::<U>() {
            return Err(TypeError::MetadataTypeMismatch {
                expected: U::METADATA_TYPE.to_string(),
                found: self.metadata_type,
            });
        }
        let metadata = serde_json::from_value(self.metadata)
            .map_err(|e| TypeError::Serialization(e.to_string()))?;
        Ok(PayloadMetadata {
            base: self.base,
            payload_id: self.payload_id,
            metadata_type: self.metadata_type,
            metadata,
        })
    }
}

#[derive(Deserialize)]
struct RawPayloadMetadata {
    #[serde(flatten)]
    base: PayloadBase,
    payload_id: PayloadId,
    metadata_type: String,
    metadata: Value,
}

impl<'de, T: MetadataSlot> Deserialize<'de> for PayloadMetadata<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPayloadMetadata::deserialize(deserializer)?;
        let metadata = read_metadata(&raw.metadata_type, raw.metadata)?;
        Ok(Self {
            base: raw.base,
            payload_id: raw.payload_id,
            metadata_type: raw.metadata_type,
            metadata,
        })
    }
}

/// The inline payload+metadata envelope. Identified by `base.id`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PayloadWithMetadata<T> {
    #[serde(flatten)]
    pub base: PayloadBase,
    metadata_type: String,
    pub metadata: T,
}

impl<T: TypedMetadata> PayloadWithMetadata<T> {
    pub fn new(base: PayloadBase, metadata: T) -> Self {
        Self {
            base,
            metadata_type: T::METADATA_TYPE.to_string(),
            metadata,
        }
    }
}

impl<T> PayloadWithMetadata<T> {
    pub fn metadata_type(&self) -> &str {
        &self.metadata_type
    }
}

#[derive(Deserialize)]
struct RawPayloadWithMetadata {
    #[serde(flatten)]
    base: PayloadBase,
    metadata_type: String,
    metadata: Value,
}

impl<'de, T: MetadataSlot> Deserialize<'de> for PayloadWithMetadata<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPayloadWithMetadata::deserialize(deserializer)?;
        let metadata = read_metadata(&raw.metadata_type, raw.metadata)?;
        Ok(Self {
            base: raw.base,
            metadata_type: raw.metadata_type,
            metadata,
        })
    }
}
