//! The queued in-memory audio source.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::builder::AudioSourceBuilder;
use crate::chunk::write_chunked;
use crate::error::AudioSourceError;
use crate::event::{AudioSourceEvent, EventBus, EventCallback};
use crate::format::{AudioDeviceInfo, AudioSourceFormat, Connectivity, DeviceKind};
use crate::node::{NodeId, SourceId};
use crate::sink::{ChunkedStream, StreamRead, StreamSink};

/// Lifecycle state of an [`AudioSource`].
///
/// The cycle is `Off -> Initializing -> Ready -> Off`, re-entrant.
/// Transitions happen only inside [`turn_on`](AudioSource::turn_on),
/// [`turn_off`](AudioSource::turn_off), and [`attach`](AudioSource::attach);
/// redundant transitions are no-ops, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// No transport exists; attachments are empty.
    Off,
    /// The source is turning on.
    ///
    /// Construction of the in-memory transport is instantaneous, so this
    /// state is never observed across an `.await` point; it exists so the
    /// state machine matches transport-backed implementations where
    /// initialization genuinely suspends.
    Initializing,
    /// The source accepts attachments.
    Ready,
}

/// Mutable state guarded by the source's single interior lock.
struct State {
    lifecycle: SourceState,
    queue: VecDeque<Vec<u8>>,
    attachments: HashMap<NodeId, Arc<ChunkedStream>>,
}

struct SourceInner {
    id: SourceId,
    format: AudioSourceFormat,
    chunk_size: usize,
    state: Mutex<State>,
    listeners: Mutex<Vec<EventCallback>>,
    bus: Arc<EventBus>,
}

impl SourceInner {
    /// Delivers an event to the private listeners first, then the shared
    /// bus, all synchronously. Called with the state lock released so
    /// listeners may call back into the source.
    fn emit(&self, event: AudioSourceEvent) {
        let listeners: Vec<EventCallback> = self.listeners.lock().clone();
        for listener in listeners {
            listener(event.clone());
        }
        self.bus.emit(&event);
    }
}

/// A queued in-memory audio source.
///
/// Producers [`push`](AudioSource::push) raw byte buffers into a FIFO
/// queue; consumers [`attach`](AudioSource::attach) stream nodes, each of
/// which drains exactly one queued buffer as a chunked, closed read stream.
/// Every lifecycle and attachment change is broadcast to the source's
/// private listeners and to a shared [`EventBus`].
///
/// `AudioSource` is cheaply cloneable; clones share the same queue,
/// attachments, and lifecycle state.
///
/// # Quick Start
///
/// ```
/// use push_audio::{AudioSource, StreamRead};
///
/// # tokio_test::block_on(async {
/// let source = AudioSource::builder().id("meeting").build();
///
/// source.push(vec![0u8; 32000]).await?;
///
/// let node = source.attach("recognizer").await?;
/// while let StreamRead::Chunk(chunk) = node.read().await {
///     // feed chunk.payload to the speech engine
///     let _ = chunk;
/// }
///
/// node.detach().await?; // closes the stream and powers the source off
/// # Ok::<(), push_audio::AudioSourceError>(())
/// # });
/// ```
#[derive(Clone)]
pub struct AudioSource {
    inner: Arc<SourceInner>,
}

impl AudioSource {
    /// Creates a source with the given format and defaults for everything
    /// else (generated id, default chunk size, fresh event bus).
    pub fn new(format: AudioSourceFormat) -> Self {
        Self::builder().format(format).build()
    }

    /// Returns a builder for configuring a source.
    pub fn builder() -> AudioSourceBuilder {
        AudioSourceBuilder::new()
    }

    pub(crate) fn from_parts(
        id: SourceId,
        format: AudioSourceFormat,
        chunk_size: usize,
        bus: Arc<EventBus>,
        listeners: Vec<EventCallback>,
    ) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                id,
                format,
                chunk_size,
                state: Mutex::new(State {
                    lifecycle: SourceState::Off,
                    queue: VecDeque::new(),
                    attachments: HashMap::new(),
                }),
                listeners: Mutex::new(listeners),
                bus,
            }),
        }
    }

    /// Returns this source's identifier.
    pub fn id(&self) -> &SourceId {
        &self.inner.id
    }

    /// Returns the immutable format supplied at construction.
    pub fn format(&self) -> AudioSourceFormat {
        self.inner.format
    }

    /// Returns a descriptive device snapshot for this source.
    pub fn device_info(&self) -> AudioDeviceInfo {
        AudioDeviceInfo {
            bits_per_sample: self.inner.format.bits_per_sample,
            channels: self.inner.format.channels,
            sample_rate: self.inner.format.samples_per_sec,
            connectivity: Connectivity::Unknown,
            kind: DeviceKind::File,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SourceState {
        self.inner.state.lock().lifecycle
    }

    /// Returns the number of buffers currently queued.
    pub fn queued_buffers(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Returns `true` if a sink is registered for the given node.
    pub fn is_attached(&self, node_id: impl Into<NodeId>) -> bool {
        self.inner
            .state
            .lock()
            .attachments
            .contains_key(&node_id.into())
    }

    /// Registers a private listener for this instance's events.
    ///
    /// Private listeners are invoked before the shared bus's listeners, in
    /// registration order, synchronously inside the emitting operation.
    /// Panicking listeners propagate out of that operation.
    pub fn subscribe(&self, callback: EventCallback) {
        self.inner.listeners.lock().push(callback);
    }

    /// Appends a buffer to the tail of the queue.
    ///
    /// Admission is checked against
    /// [`max_allowed_bytes`](AudioSourceFormat::max_allowed_bytes) for the
    /// source's format. A rejected buffer leaves the queue unchanged and
    /// additionally emits an [`AudioSourceEvent::Error`] naming the limit.
    /// Never blocks and never touches lifecycle state; queue length is
    /// unbounded (backpressure is the producer's responsibility).
    ///
    /// # Errors
    ///
    /// [`AudioSourceError::BufferTooLarge`] if the buffer exceeds the limit.
    pub async fn push(&self, buffer: Vec<u8>) -> Result<(), AudioSourceError> {
        let limit = self.inner.format.max_allowed_bytes();
        if buffer.len() > limit {
            let err = AudioSourceError::BufferTooLarge {
                size: buffer.len(),
                limit,
            };
            self.inner.emit(AudioSourceEvent::Error {
                source_id: self.inner.id.clone(),
                message: err.to_string(),
                context: "push".to_string(),
            });
            return Err(err);
        }

        self.inner.state.lock().queue.push_back(buffer);
        Ok(())
    }

    /// Turns the source on.
    ///
    /// Emits `Initializing` then `Ready` and moves through the matching
    /// states. Idempotent: when already `Ready` or `Initializing` this
    /// resolves successfully without emitting anything.
    pub async fn turn_on(&self) -> Result<(), AudioSourceError> {
        {
            let mut state = self.inner.state.lock();
            match state.lifecycle {
                SourceState::Ready | SourceState::Initializing => return Ok(()),
                SourceState::Off => state.lifecycle = SourceState::Initializing,
            }
        }
        self.inner.emit(AudioSourceEvent::Initializing {
            source_id: self.inner.id.clone(),
        });

        // The in-memory transport needs no handshake; become ready at once.
        self.inner.state.lock().lifecycle = SourceState::Ready;
        self.inner.emit(AudioSourceEvent::Ready {
            source_id: self.inner.id.clone(),
        });

        tracing::debug!(source_id = %self.inner.id, "audio source ready");
        Ok(())
    }

    /// Turns the source off, closing every open sink and clearing the
    /// attachment registry.
    ///
    /// Idempotent, but the `Off` event is emitted on every call - even a
    /// redundant one - so listeners must not assume emission implies a
    /// state change.
    pub async fn turn_off(&self) -> Result<(), AudioSourceError> {
        let sinks: Vec<Arc<ChunkedStream>> = {
            let mut state = self.inner.state.lock();
            state.lifecycle = SourceState::Off;
            state.attachments.drain().map(|(_, sink)| sink).collect()
        };
        for sink in &sinks {
            if !sink.is_closed() {
                sink.close();
            }
        }

        self.inner.emit(AudioSourceEvent::Off {
            source_id: self.inner.id.clone(),
        });

        tracing::debug!(
            source_id = %self.inner.id,
            closed_sinks = sinks.len(),
            "audio source off"
        );
        Ok(())
    }

    /// Attaches a stream node, draining one queued buffer into a new sink.
    ///
    /// Emits `AttachingStreamNode`, ensures the source is turned on, pops
    /// the oldest queued buffer (FIFO: first-attached gets first-queued),
    /// chunk-writes it into a fresh sink registered under `node_id`, closes
    /// the sink, and emits `AttachedStreamNode`. Attaching a node id that
    /// is already attached replaces its sink; the previous sink is closed.
    ///
    /// # Errors
    ///
    /// [`AudioSourceError::NoQueuedData`] if the queue is empty; no sink is
    /// registered for `node_id` in that case.
    pub async fn attach(
        &self,
        node_id: impl Into<NodeId>,
    ) -> Result<StreamNodeHandle, AudioSourceError> {
        let node_id = node_id.into();
        self.inner.emit(AudioSourceEvent::AttachingStreamNode {
            source_id: self.inner.id.clone(),
            node_id: node_id.clone(),
        });

        self.turn_on().await?;

        let (buffer, sink) = {
            let mut state = self.inner.state.lock();
            let Some(buffer) = state.queue.pop_front() else {
                return Err(AudioSourceError::NoQueuedData { node_id });
            };
            let sink = Arc::new(ChunkedStream::new());
            if let Some(previous) = state
                .attachments
                .insert(node_id.clone(), Arc::clone(&sink))
            {
                previous.close();
            }
            (buffer, sink)
        };

        write_chunked(&buffer, self.inner.chunk_size, sink.as_ref()).await?;

        self.inner.emit(AudioSourceEvent::AttachedStreamNode {
            source_id: self.inner.id.clone(),
            node_id: node_id.clone(),
        });

        tracing::debug!(
            source_id = %self.inner.id,
            node_id = %node_id,
            bytes = buffer.len(),
            "stream node attached"
        );

        Ok(StreamNodeHandle {
            node_id,
            sink,
            source: self.clone(),
            detached: AtomicBool::new(false),
        })
    }

    /// Detaches the named node: closes its sink, removes it from the
    /// registry, and emits `DetachedStreamNode`.
    ///
    /// Detaching an unknown or already-detached node is a silent no-op.
    /// Unlike [`StreamNodeHandle::detach`], this leaves the lifecycle
    /// state and any other attachments alone.
    pub async fn detach(&self, node_id: impl Into<NodeId>) {
        let node_id = node_id.into();
        let removed = self.inner.state.lock().attachments.remove(&node_id);
        let Some(sink) = removed else {
            return;
        };
        if !sink.is_closed() {
            sink.close();
        }
        self.inner.emit(AudioSourceEvent::DetachedStreamNode {
            source_id: self.inner.id.clone(),
            node_id,
        });
    }
}

/// Handle to an attached stream node, returned by
/// [`AudioSource::attach`].
///
/// Reads delegate to the node's sink cursor. Detaching through the handle
/// follows the single-consumer pattern: it closes this node's sink and
/// then powers the whole source off, closing any other attachments too.
/// Use [`AudioSource::detach`] to remove a single node without powering
/// off.
pub struct StreamNodeHandle {
    node_id: NodeId,
    sink: Arc<ChunkedStream>,
    source: AudioSource,
    detached: AtomicBool,
}

impl StreamNodeHandle {
    /// Returns the id of the attached node.
    pub fn id(&self) -> &NodeId {
        &self.node_id
    }

    /// Reads the next chunk from this node's sink.
    ///
    /// After the sink is drained - or after [`detach`](Self::detach) was
    /// called - this yields [`StreamRead::End`], never an error and never
    /// new data.
    pub async fn read(&self) -> StreamRead {
        if self.detached.load(Ordering::SeqCst) {
            return StreamRead::End;
        }
        self.sink.read().await
    }

    /// Detaches this node and powers the source off.
    ///
    /// Emits `DetachedStreamNode` for this node followed by the `Off`
    /// event from the shutdown. Calling it a second time is a no-op.
    pub async fn detach(&self) -> Result<(), AudioSourceError> {
        if self.detached.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.source.detach(self.node_id.clone()).await;
        self.source.turn_off().await
    }
}
