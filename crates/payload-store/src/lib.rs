//! Backing store contract for payload storage.
//!
//! The typed clients never talk to a concrete backend. They issue
//! create/read/append/paginate calls through the [`PayloadStore`] trait,
//! keyed by `(partition_key, payload_id, resource_kind)`, with values carried
//! as JSON. Any backend that satisfies the trait's contract is acceptable.
//!
//! # Resource Kinds
//!
//! - [`ResourceKind::InlineData`] -- single-valued data slot
//! - [`ResourceKind::InlineMetadata`] -- single-valued metadata slot
//! - [`ResourceKind::MetadataCollection`] -- append-only metadata items
//! - [`ResourceKind::DataReferenceCollection`] -- append-only reference descriptors
//!
//! # Storage Backends
//!
//! - [`InMemoryPayloadStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Contract
//!
//! 1. Payload ids are unique within a partition; creating a duplicate is a conflict.
//! 2. Slot writes replace the previous value; there is no history.
//! 3. Collection appends are all-or-nothing and keep batch order.
//! 4. Order across concurrent batches is unspecified.
//! 5. A non-empty continuation token means at least one more chunk exists.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod key;
pub mod memory;
pub mod token;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use key::{PayloadKey, PayloadRecord, ResourceKind};
pub use memory::InMemoryPayloadStore;
pub use traits::PayloadStore;
