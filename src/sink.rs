//! Stream sink contract and the in-memory implementation.
//!
//! A [`StreamSink`] is the per-attachment owner of chunk data: the source
//! writes chunks into it and the attached consumer reads them back through
//! its cursor. The crate provides [`ChunkedStream`], the in-memory sink the
//! source allocates for every attachment; the trait exists so a consumer
//! can observe the same write/close protocol against its own sink type.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::chunk::AudioChunk;
use crate::error::AudioSourceError;

/// Outcome of a [`StreamSink::read`] call.
///
/// Reading past the close point yields [`End`](StreamRead::End), never an
/// error - end-of-stream is a normal condition for a drained consumer.
#[derive(Debug, Clone)]
pub enum StreamRead {
    /// The next chunk in write order.
    Chunk(AudioChunk),

    /// No chunk is available yet, but the sink is still open.
    ///
    /// Not observed through source-allocated sinks (the source closes every
    /// sink it fills before handing it out); external sinks that are
    /// written incrementally can surface it.
    Pending,

    /// The sink is closed and every chunk has been read.
    End,
}

impl StreamRead {
    /// Returns the chunk if this read produced one.
    pub fn chunk(self) -> Option<AudioChunk> {
        match self {
            Self::Chunk(chunk) => Some(chunk),
            Self::Pending | Self::End => None,
        }
    }
}

/// Per-attachment destination for chunked audio data.
///
/// The source dictates the protocol: chunks are written in strictly
/// increasing offset order, and `close` is the end-of-data signal (no
/// trailing end record is written). Closing is monotonic - a closed sink
/// accepts no further writes, and reads observe [`StreamRead::End`] once
/// the remaining chunks are drained.
///
/// # Implementation Notes
///
/// - Methods take `&self` - use interior mutability (`Mutex`, `RwLock`)
/// - `write_chunk` must fail with [`AudioSourceError::StreamClosed`] after
///   `close` was called
/// - `read` must return chunks in write order, then [`StreamRead::End`]
///   forever once closed and drained
#[async_trait]
pub trait StreamSink: Send + Sync {
    /// Appends a chunk to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`AudioSourceError::StreamClosed`] if the sink was closed.
    async fn write_chunk(&self, chunk: AudioChunk) -> Result<(), AudioSourceError>;

    /// Marks the sink closed, signaling end-of-data to readers.
    ///
    /// Idempotent; closing an already closed sink is a no-op.
    fn close(&self);

    /// Returns `true` once the sink has been closed.
    fn is_closed(&self) -> bool;

    /// Advances the read cursor and returns the next outcome.
    async fn read(&self) -> StreamRead;
}

struct StreamState {
    chunks: Vec<AudioChunk>,
    cursor: usize,
    closed: bool,
}

/// In-memory [`StreamSink`] with a single read cursor.
///
/// One `ChunkedStream` is allocated per attachment and filled from exactly
/// one queued buffer. Chunks stay buffered after being read so the payload
/// Arcs keep readers zero-copy; the whole stream is discarded on detach.
///
/// # Example
///
/// ```
/// use push_audio::{AudioChunk, ChunkedStream, StreamRead, StreamSink};
///
/// # tokio_test::block_on(async {
/// let sink = ChunkedStream::new();
/// sink.write_chunk(AudioChunk::new(vec![1, 2, 3])).await?;
/// sink.close();
///
/// assert!(matches!(sink.read().await, StreamRead::Chunk(_)));
/// assert!(matches!(sink.read().await, StreamRead::End));
/// # Ok::<(), push_audio::AudioSourceError>(())
/// # });
/// ```
#[derive(Default)]
pub struct ChunkedStream {
    state: Mutex<StreamState>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            chunks: Vec::new(),
            cursor: 0,
            closed: false,
        }
    }
}

impl ChunkedStream {
    /// Creates an empty, open stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of chunks written so far.
    pub fn chunk_count(&self) -> usize {
        self.state.lock().chunks.len()
    }
}

#[async_trait]
impl StreamSink for ChunkedStream {
    async fn write_chunk(&self, chunk: AudioChunk) -> Result<(), AudioSourceError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(AudioSourceError::StreamClosed);
        }
        state.chunks.push(chunk);
        Ok(())
    }

    fn close(&self) {
        self.state.lock().closed = true;
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    async fn read(&self) -> StreamRead {
        let mut state = self.state.lock();
        if state.cursor < state.chunks.len() {
            let chunk = state.chunks[state.cursor].clone();
            state.cursor += 1;
            StreamRead::Chunk(chunk)
        } else if state.closed {
            StreamRead::End
        } else {
            StreamRead::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_read_in_write_order() {
        let sink = ChunkedStream::new();
        sink.write_chunk(AudioChunk::new(vec![1])).await.unwrap();
        sink.write_chunk(AudioChunk::new(vec![2])).await.unwrap();
        sink.close();

        let first = sink.read().await.chunk().unwrap();
        let second = sink.read().await.chunk().unwrap();
        assert_eq!(*first.payload, vec![1]);
        assert_eq!(*second.payload, vec![2]);
        assert!(matches!(sink.read().await, StreamRead::End));
    }

    #[tokio::test]
    async fn test_read_open_and_empty_is_pending() {
        let sink = ChunkedStream::new();
        assert!(matches!(sink.read().await, StreamRead::Pending));
    }

    #[tokio::test]
    async fn test_write_after_close_rejected() {
        let sink = ChunkedStream::new();
        sink.close();

        let result = sink.write_chunk(AudioChunk::new(vec![1])).await;
        assert!(matches!(result, Err(AudioSourceError::StreamClosed)));
        assert_eq!(sink.chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let sink = ChunkedStream::new();
        sink.close();
        sink.close();
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn test_remaining_chunks_readable_after_close() {
        let sink = ChunkedStream::new();
        sink.write_chunk(AudioChunk::new(vec![9; 10])).await.unwrap();
        sink.close();

        assert!(sink.read().await.chunk().is_some());
        assert!(matches!(sink.read().await, StreamRead::End));
    }

    #[tokio::test]
    async fn test_end_is_sticky() {
        let sink = ChunkedStream::new();
        sink.close();
        assert!(matches!(sink.read().await, StreamRead::End));
        assert!(matches!(sink.read().await, StreamRead::End));
    }

    #[test]
    fn test_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<dyn StreamSink>>();
    }
}
