//! Audio data chunk and the chunked write routine.

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::AudioSourceError;
use crate::sink::StreamSink;

/// Default size of each chunk written into a sink, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A bounded slice of a pushed buffer, written sequentially into a sink.
///
/// `AudioChunk` is the unit of data a stream node reads. The payload is
/// Arc-wrapped so a chunk can be handed to a reader without copying the
/// bytes out of the sink's buffer.
///
/// # Example
///
/// ```
/// use push_audio::AudioChunk;
///
/// let chunk = AudioChunk::new(vec![0u8; 4096]);
/// assert_eq!(chunk.len(), 4096);
/// assert!(!chunk.is_end);
///
/// let shared = chunk.clone(); // cheap clone - shares the payload
/// assert_eq!(shared.len(), 4096);
/// ```
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw audio bytes carried by this chunk.
    ///
    /// Wrapped in `Arc` for zero-copy sharing between the sink and readers.
    pub payload: Arc<Vec<u8>>,

    /// Whether this record marks end-of-data.
    ///
    /// The source never writes an end record itself - closing the sink is
    /// the end signal - but the field is part of the sink wire contract so
    /// external sink implementations can represent one.
    pub is_end: bool,

    /// When this chunk was written into the sink.
    pub time_received: SystemTime,
}

impl AudioChunk {
    /// Creates a data chunk carrying the given bytes, stamped with the
    /// current time.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: Arc::new(payload),
            is_end: false,
            time_received: SystemTime::now(),
        }
    }

    /// Returns the payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if this chunk carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Splits `buffer` into `chunk_size` slices and writes them, in order, into
/// `sink`, then closes the sink.
///
/// Chunking is deterministic: chunk *k* covers the byte range
/// `[k * chunk_size, min((k + 1) * chunk_size, buffer.len()))`. The last
/// chunk may be shorter than `chunk_size`. A zero-length buffer yields zero
/// chunks immediately followed by close.
///
/// `chunk_size` must be non-zero; the builder clamps a zero configuration
/// to [`DEFAULT_CHUNK_SIZE`] before it reaches this routine.
///
/// # Errors
///
/// Propagates [`AudioSourceError::StreamClosed`] if the sink refuses a
/// write. The source only calls this with a freshly allocated sink, so the
/// error path is reachable only through external [`StreamSink`] impls.
pub(crate) async fn write_chunked(
    buffer: &[u8],
    chunk_size: usize,
    sink: &dyn StreamSink,
) -> Result<(), AudioSourceError> {
    debug_assert!(chunk_size > 0);

    let mut written = 0usize;
    for part in buffer.chunks(chunk_size) {
        sink.write_chunk(AudioChunk::new(part.to_vec())).await?;
        written += 1;
    }
    sink.close();

    tracing::trace!(
        bytes = buffer.len(),
        chunks = written,
        chunk_size,
        "buffer chunked into sink"
    );
    Ok(())
}
