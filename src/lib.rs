//! # push-audio
//!
//! Queued in-memory audio source for speech-processing pipelines.
//!
//! `push-audio` accepts discrete audio buffers pushed by a producer, queues
//! them FIFO under a per-format admission limit, and exposes them as one or
//! more independently attachable stream nodes. Each attached node drains
//! exactly one queued buffer as an ordered sequence of fixed-size chunks
//! terminated by a close marker - the shape a downstream speech engine
//! expects from any audio source implementation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use push_audio::{AudioSource, AudioSourceFormat, StreamRead};
//!
//! let source = AudioSource::builder()
//!     .format(AudioSourceFormat::speech()) // 16kHz 16-bit mono
//!     .on_event(|e| tracing::debug!(?e, "audio source event"))
//!     .build();
//!
//! // Producer side: push raw audio buffers.
//! source.push(pcm_bytes).await?;
//!
//! // Consumer side: attach a stream node and read chunks.
//! let node = source.attach("recognizer").await?;
//! while let StreamRead::Chunk(chunk) = node.read().await {
//!     engine.feed(&chunk.payload);
//! }
//! node.detach().await?;
//! ```
//!
//! ## Architecture
//!
//! - **Queue**: pushed buffers wait FIFO; each buffer is individually
//!   bounded by the format's admission limit, the queue itself is not.
//! - **Lifecycle**: an explicit `Off -> Initializing -> Ready -> Off` state
//!   machine with idempotent transitions; attaching turns the source on.
//! - **Attachments**: one [`ChunkedStream`] sink per attached node, each
//!   independently detachable.
//! - **Events**: every transition and attachment change is delivered
//!   synchronously to the instance's private listeners and to a shared,
//!   injectable [`EventBus`].
//!
//! All state mutation happens synchronously inside the operation that
//! initiates it; operations are `async` only to keep the contract uniform
//! with transport-backed sources that genuinely suspend.

#![warn(missing_docs)]
// unwrap/expect allowed in tests only
#![allow(clippy::unwrap_used)]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod builder;
mod chunk;
mod error;
mod event;
mod format;
mod node;
mod sink;
mod source;

pub use builder::AudioSourceBuilder;
pub use chunk::{AudioChunk, DEFAULT_CHUNK_SIZE};
pub use error::AudioSourceError;
pub use event::{event_callback, AudioSourceEvent, EventBus, EventCallback};
pub use format::{AudioDeviceInfo, AudioSourceFormat, Connectivity, DeviceKind};
pub use node::{NodeId, SourceId};
pub use sink::{ChunkedStream, StreamRead, StreamSink};
pub use source::{AudioSource, SourceState, StreamNodeHandle};
