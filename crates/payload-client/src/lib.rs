//! Typed client for payload storage.
//!
//! A payload is an opaque object addressed by a generated [`PayloadId`] and
//! an optional [`PartitionKey`]. Each payload owns one inline data slot, one
//! inline metadata slot, an append-only metadata collection, and an
//! append-only collection of data reference descriptors.
//!
//! [`PayloadApiClient`] creates payloads and returns a [`PayloadClient`]
//! bound to each one. The payload client hands out typed sub-clients:
//!
//! - [`DataClient`] -- reads the inline data slot
//! - [`MetadataCollectionClient`] -- appends and pages through metadata items
//! - [`DataReferencesClient`] -- appends and pages through data references
//!
//! Collection reads return a [`PagedSequence`]: lazy, finite, and restartable.
//! Order inside one appended batch is preserved. Order between concurrent
//! batches against the same payload is unspecified.
//!
//! Every operation is timed through an [`OperationMetrics`] sink and can be
//! abandoned through a `tokio_util` cancellation token.

pub mod api;
pub mod config;
mod context;
pub mod data;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod pagination;
pub mod payload;
pub mod references;
mod source;

#[cfg(test)]
mod testing;

pub use api::PayloadApiClient;
pub use config::ClientConfig;
pub use data::{DataClient, PayloadValue};
pub use error::{ClientError, ClientResult};
pub use metadata::MetadataCollectionClient;
pub use metrics::{OperationMetrics, OperationTimer, Outcome, RecordingMetrics, TracingMetrics};
pub use pagination::{ChunkSource, PagedSequence};
pub use payload::PayloadClient;
pub use references::DataReferencesClient;

// Re-export key types
pub use payload_store::{InMemoryPayloadStore, PayloadKey, PayloadRecord, PayloadStore, ResourceKind};
pub use payload_types::{
    ContinuationToken, DataChunk, DataReferenceKey, LocDataElementType,
    LocElementDataReferenceDescriptor, PartitionKey, PayloadData, PayloadId, PayloadMetadata,
    PayloadWithMetadata, TypedMetadata,
};
pub use tokio_util::sync::CancellationToken;
