use thiserror::Error;

/// Errors produced by type construction and conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid partition key {key:?}: {reason}")]
    InvalidPartitionKey { key: String, reason: String },

    #[error("invalid payload id {0:?}")]
    InvalidPayloadId(String),

    #[error("metadata type mismatch: expected {expected}, found {found}")]
    MetadataTypeMismatch { expected: String, found: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
