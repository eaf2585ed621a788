//! Foundation types for payload storage.
//!
//! This crate provides the identifier, envelope, and chunk types shared by
//! the store seam and the typed clients. Every other payload crate depends on
//! `payload-types`.
//!
//! # Key Types
//!
//! - [`PayloadId`] -- Generated payload identifier (UUID v7 string)
//! - [`PartitionKey`] -- Validated caller-chosen co-location key
//! - [`PayloadBase`] -- Identity, category, and timestamps shared by envelopes
//! - [`PayloadData`] -- The single inline data slot of a payload
//! - [`PayloadMetadata`] -- One item of a payload's metadata collection
//! - [`PayloadWithMetadata`] -- The inline payload+metadata envelope
//! - [`ItemWithPartition`] -- A value stamped with a fresh id and a partition
//! - [`DataChunk`] -- One page of a paged read plus its continuation token
//! - [`LocElementDataReferenceDescriptor`] -- Pointer to external localized content

pub mod chunk;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod model;
pub mod reference;

pub use chunk::{ContinuationToken, DataChunk};
pub use error::TypeError;
pub use ids::{PartitionKey, PayloadId};
pub use metadata::{MetadataSlot, PayloadMetadata, PayloadWithMetadata, TypedMetadata};
pub use model::{ItemWithPartition, PayloadBase, PayloadData};
pub use reference::{
    DataAccessDescriptor, DataReferenceKey, LocDataElementType, LocElementDataReferenceDescriptor,
    LocElementMetadata,
};
