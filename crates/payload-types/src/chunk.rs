use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque cursor returned by a paged read.
///
/// Only the store that issued a token can interpret it. An empty token is
/// equivalent to no token at all: the sequence has ended.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContinuationToken({:?})", self.0)
    }
}

/// One page of a paged read.
///
/// A chunk with a non-empty continuation token guarantees at least one more
/// chunk exists. `items` may be empty even then (a page fully consumed by
/// filtering), so end-of-sequence is signalled by the token alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChunk<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    continuation_token: Option<ContinuationToken>,
    items: Vec<T>,
}

impl<T> DataChunk<T> {
    pub fn new(items: Vec<T>, continuation_token: Option<ContinuationToken>) -> Self {
        Self {
            continuation_token: continuation_token.filter(|t| !t.is_empty()),
            items,
        }
    }

    /// The final chunk of a sequence.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Token for the next chunk, or `None` at end of sequence.
    pub fn continuation_token(&self) -> Option<&ContinuationToken> {
        self.continuation_token.as_ref().filter(|t| !t.is_empty())
    }

    pub fn has_more(&self) -> bool {
        self.continuation_token().is_some()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, Option<ContinuationToken>) {
        let token = self.continuation_token.filter(|t| !t.is_empty());
        (self.items, token)
    }

    /// Convert every item, keeping the token. Stops at the first error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<DataChunk<U>, E> {
        let (items, token) = self.into_parts();
        let items = items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(DataChunk::new(items, token))
    }
}
