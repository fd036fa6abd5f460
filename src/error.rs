//! Error types for push-audio.
//!
//! Errors are deliberately few: admission and attachment failures returned
//! from [`AudioSource`](crate::AudioSource) operations, plus one
//! sink-contract violation. Everything else (detaching an unknown node,
//! redundant lifecycle transitions) is a defined no-op, not an error.

use crate::node::NodeId;

/// Errors returned by audio source operations.
///
/// A failed operation never leaves partial state behind: a rejected push
/// leaves the queue untouched, and a failed attach leaves no sink
/// registered for the requested node.
#[derive(Debug, thiserror::Error)]
pub enum AudioSourceError {
    /// A pushed buffer exceeded the admission limit for the source format.
    ///
    /// The limit is ten minutes of audio at the configured sample rate plus
    /// a fixed header allowance; see
    /// [`AudioSourceFormat::max_allowed_bytes`](crate::AudioSourceFormat::max_allowed_bytes).
    #[error("buffer of {size} bytes exceeds the {limit} byte limit for this format")]
    BufferTooLarge {
        /// Size of the rejected buffer in bytes.
        size: usize,
        /// The computed admission limit in bytes.
        limit: usize,
    },

    /// A stream node was attached while no buffers were queued.
    ///
    /// Each attached node consumes exactly one queued buffer; attaching
    /// more nodes than buffers were pushed surfaces this error.
    #[error("no queued audio available for stream node: {node_id}")]
    NoQueuedData {
        /// The node whose attachment could not be served.
        node_id: NodeId,
    },

    /// A chunk was written to a sink that has already been closed.
    ///
    /// Closing is monotonic: once a sink is closed it accepts no further
    /// writes. The source itself never writes after close; this surfaces
    /// only to external [`StreamSink`](crate::StreamSink) users.
    #[error("stream sink is closed")]
    StreamClosed,
}
