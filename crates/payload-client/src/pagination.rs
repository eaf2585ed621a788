//! Continuation-token paging over chunked collection reads.
//!
//! A [`PagedSequence`] starts with no token, fetches one [`DataChunk`],
//! yields its items, and keeps requesting chunks with the returned token
//! until a chunk comes back without one. Chunks are concatenated in the
//! order the store returns them. An empty chunk that still carries a token
//! does not end the sequence.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use payload_types::{ContinuationToken, DataChunk};
use tracing::warn;

use crate::error::{ClientError, ClientResult};

/// Something that can produce one chunk of a collection for a given token.
#[async_trait]
pub trait ChunkSource<T>: Send + Sync {
    async fn fetch_chunk(&self, token: Option<ContinuationToken>) -> ClientResult<DataChunk<T>>;
}

enum Cursor {
    Start,
    Next {
        token: ContinuationToken,
        fetched: usize,
    },
    Done,
}

/// A finite, restartable, lazily fetched sequence.
///
/// Nothing is fetched until a stream is polled. Every call to
/// [`stream`](Self::stream) or [`chunks`](Self::chunks) starts over from the
/// first chunk.
pub struct PagedSequence<T> {
    source: Arc<dyn ChunkSource<T>>,
    max_chunks: Option<usize>,
}

impl<T> Clone for PagedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            max_chunks: self.max_chunks,
        }
    }
}

impl<T: Send + 'static> PagedSequence<T> {
    pub fn new(source: Arc<dyn ChunkSource<T>>) -> Self {
        Self {
            source,
            max_chunks: None,
        }
    }

    /// Fail with [`ClientError::TransientIo`] instead of fetching more than
    /// `max_chunks` chunks.
    pub fn with_max_chunks(mut self, max_chunks: Option<usize>) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Stream of raw chunks, tokens included.
    pub fn chunks(&self) -> BoxStream<'static, ClientResult<DataChunk<T>>> {
        let source = Arc::clone(&self.source);
        let max_chunks = self.max_chunks;

        stream::try_unfold(Cursor::Start, move |cursor| {
            let source = Arc::clone(&source);
            async move {
                let (token, fetched) = match cursor {
                    Cursor::Done => return Ok(None),
                    Cursor::Start => (None, 0),
                    Cursor::Next { token, fetched } => (Some(token), fetched),
                };

                if let Some(limit) = max_chunks {
                    if fetched >= limit {
                        warn!(limit, "paged read exceeded its chunk limit");
                        return Err(ClientError::TransientIo(format!(
                            "paged read did not finish within {limit} chunks"
                        )));
                    }
                }

                let chunk = source.fetch_chunk(token.clone()).await?;
                let next = match chunk.continuation_token() {
                    None => Cursor::Done,
                    Some(next) if token.as_ref() == Some(next) => {
                        warn!(token = next.as_str(), "store repeated a continuation token");
                        return Err(ClientError::TransientIo(format!(
                            "store returned the same continuation token twice: {next:?}"
                        )));
                    }
                    Some(next) => Cursor::Next {
                        token: next.clone(),
                        fetched: fetched + 1,
                    },
                };
                Ok(Some((chunk, next)))
            }
        })
        .boxed()
    }

    /// Stream of items across all chunks.
    pub fn stream(&self) -> BoxStream<'static, ClientResult<T>> {
        self.chunks()
            .map_ok(|chunk| {
                let (items, _) = chunk.into_parts();
                stream::iter(items.into_iter().map(Ok::<T, ClientError>))
            })
            .try_flatten()
            .boxed()
    }

    /// Read every item to exhaustion.
    pub async fn collect_all(&self) -> ClientResult<Vec<T>> {
        self.stream().try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a fixed list of pages; page `i` is addressed by token `p{i}`.
    struct ScriptedSource {
        pages: Vec<Vec<u32>>,
        calls: AtomicUsize,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Vec<u32>>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
                seen_tokens: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChunkSource<u32> for ScriptedSource {
        async fn fetch_chunk(
            &self,
            token: Option<ContinuationToken>,
        ) -> ClientResult<DataChunk<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_tokens
                .lock()
                .unwrap()
                .push(token.as_ref().map(|t| t.as_str().to_string()));

            let index = match &token {
                None => 0,
                Some(t) => t.as_str()[1..].parse::<usize>().unwrap(),
            };
            let items = self.pages.get(index).cloned().unwrap_or_default();
            let more = index + 1 < self.pages.len();
            let next = more.then(|| ContinuationToken::new(format!("p{}", index + 1)));
            Ok(DataChunk::new(items, next))
        }
    }

    /// Always answers with the same token.
    struct StuckSource;

    #[async_trait]
    impl ChunkSource<u32> for StuckSource {
        async fn fetch_chunk(&self, _: Option<ContinuationToken>) -> ClientResult<DataChunk<u32>> {
            Ok(DataChunk::new(vec![1], Some(ContinuationToken::new("again"))))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ChunkSource<u32> for FailingSource {
        async fn fetch_chunk(&self, _: Option<ContinuationToken>) -> ClientResult<DataChunk<u32>> {
            Err(ClientError::TransientIo("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn one_item_per_chunk_then_empty_terminator() {
        let source = Arc::new(ScriptedSource::new(vec![
            vec![1],
            vec![2],
            vec![3],
            vec![4],
            vec![5],
            vec![],
        ]));
        let seq = PagedSequence::new(source.clone() as Arc<dyn ChunkSource<u32>>);

        let items = seq.collect_all().await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(source.calls(), 6);

        let tokens = source.seen_tokens.lock().unwrap().clone();
        assert_eq!(tokens[0], None);
        assert_eq!(tokens[5].as_deref(), Some("p5"));
    }

    #[tokio::test]
    async fn empty_chunks_with_tokens_do_not_end_the_sequence() {
        let source = Arc::new(ScriptedSource::new(vec![vec![], vec![], vec![7], vec![], vec![8, 9]]));
        let seq = PagedSequence::new(source.clone() as Arc<dyn ChunkSource<u32>>);

        assert_eq!(seq.collect_all().await.unwrap(), vec![7, 8, 9]);
        assert_eq!(source.calls(), 5);
    }

    #[tokio::test]
    async fn sequence_is_lazy_and_restartable() {
        let source = Arc::new(ScriptedSource::new(vec![vec![1, 2], vec![3]]));
        let seq = PagedSequence::new(source.clone() as Arc<dyn ChunkSource<u32>>);
        assert_eq!(source.calls(), 0);

        let first = seq.collect_all().await.unwrap();
        let second = seq.clone().collect_all().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn partial_consumption_stops_fetching() {
        let source = Arc::new(ScriptedSource::new(vec![vec![1, 2], vec![3], vec![4]]));
        let seq = PagedSequence::new(source.clone() as Arc<dyn ChunkSource<u32>>);

        let first_two: Vec<u32> = seq.stream().take(2).try_collect().await.unwrap();
        assert_eq!(first_two, vec![1, 2]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn chunks_expose_tokens() {
        let source = Arc::new(ScriptedSource::new(vec![vec![1], vec![2]]));
        let seq = PagedSequence::new(source as Arc<dyn ChunkSource<u32>>);
        let chunks: Vec<DataChunk<u32>> = seq.chunks().try_collect().await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].has_more());
        assert!(!chunks[1].has_more());
    }

    #[tokio::test]
    async fn repeated_token_is_an_error() {
        let seq = PagedSequence::new(Arc::new(StuckSource) as Arc<dyn ChunkSource<u32>>);
        let err = seq.collect_all().await.unwrap_err();
        assert!(matches!(err, ClientError::TransientIo(_)));
    }

    #[tokio::test]
    async fn chunk_limit_stops_runaway_reads() {
        let source = Arc::new(ScriptedSource::new(vec![vec![1]; 10]));
        let seq = PagedSequence::new(source.clone() as Arc<dyn ChunkSource<u32>>)
            .with_max_chunks(Some(3));
        let err = seq.collect_all().await.unwrap_err();
        assert!(matches!(err, ClientError::TransientIo(_)));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let seq = PagedSequence::new(Arc::new(FailingSource) as Arc<dyn ChunkSource<u32>>);
        assert!(matches!(
            seq.collect_all().await,
            Err(ClientError::TransientIo(_))
        ));
    }

    proptest! {
        #[test]
        fn terminates_after_exactly_one_fetch_per_page(
            pages in proptest::collection::vec(proptest::collection::vec(any::<u32>(), 0..4), 1..20)
        ) {
            let expected: Vec<u32> = pages.iter().flatten().copied().collect();
            let page_count = pages.len();
            let source = Arc::new(ScriptedSource::new(pages));
            let seq = PagedSequence::new(source.clone() as Arc<dyn ChunkSource<u32>>);

            let items = futures::executor::block_on(seq.collect_all()).unwrap();
            prop_assert_eq!(items, expected);
            prop_assert_eq!(source.calls(), page_count);
        }
    }
}
