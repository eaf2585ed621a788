//! Offset-based continuation tokens.
//!
//! Tokens are opaque to callers. Backends that page by position can use
//! these helpers; the encoding is versioned so a backend can change it
//! without misreading old tokens.

use payload_types::ContinuationToken;

use crate::error::{StoreError, StoreResult};

const PREFIX: &str = "o1.";

/// Encode a collection offset as a continuation token.
pub fn encode_offset(offset: usize) -> ContinuationToken {
    ContinuationToken::new(format!("{PREFIX}{offset:x}"))
}

/// Decode a token produced by [`encode_offset`].
pub fn decode_offset(token: &ContinuationToken) -> StoreResult<usize> {
    let raw = token.as_str().strip_prefix(PREFIX).ok_or_else(|| {
        StoreError::InvalidInput(format!("unrecognized continuation token {token:?}"))
    })?;
    usize::from_str_radix(raw, 16).map_err(|e| {
        StoreError::InvalidInput(format!("malformed continuation token {token:?}: {e}"))
    })
}
