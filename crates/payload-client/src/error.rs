use payload_store::StoreError;
use payload_types::TypeError;
use thiserror::Error;

/// Errors surfaced by the payload clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed partition key, payload id, or request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload, or a slot that was never written, does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store was unreachable while connecting or creating a payload.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Payload id collision on creation. Never retried by the client.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network failure or timeout talking to the backing store.
    #[error("transient I/O error: {0}")]
    TransientIo(String),

    /// The operation's cancellation token fired before the store answered.
    #[error("operation cancelled: {0}")]
    Cancelled(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Map a store failure that happened while connecting or creating a
    /// payload. Reachability problems become [`ClientError::Initialization`].
    pub fn from_initialization(err: StoreError) -> Self {
        if err.is_transient() {
            ClientError::Initialization(err.to_string())
        } else {
            ClientError::from(err)
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ClientError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => ClientError::Conflict(msg),
            StoreError::InvalidInput(msg) => ClientError::InvalidArgument(msg),
            StoreError::Serialization(msg) => ClientError::Serialization(msg),
            StoreError::Unavailable(_) | StoreError::Timeout(_) | StoreError::Backend(_) => {
                ClientError::TransientIo(err.to_string())
            }
        }
    }
}

impl From<TypeError> for ClientError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidPartitionKey { .. } | TypeError::InvalidPayloadId(_) => {
                ClientError::InvalidArgument(err.to_string())
            }
            TypeError::MetadataTypeMismatch { .. } | TypeError::Serialization(_) => {
                ClientError::Serialization(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
