//! Lifecycle and attachment events.
//!
//! Every state transition and attachment change is delivered to two
//! subscriber sets: the source's private listeners and the listeners of a
//! shared [`EventBus`] that can span several source instances. Delivery is
//! synchronous inside the emitting call, private listeners first.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::node::{NodeId, SourceId};

/// Events emitted by an [`AudioSource`](crate::AudioSource).
///
/// Events are informational; the source keeps running after any of them.
/// Each carries the id of the emitting source so listeners on a shared
/// [`EventBus`] can tell instances apart.
///
/// # Example
///
/// ```
/// use push_audio::AudioSourceEvent;
///
/// fn handle_event(event: AudioSourceEvent) {
///     match event {
///         AudioSourceEvent::Ready { source_id } => {
///             println!("source {source_id} is ready");
///         }
///         AudioSourceEvent::Error { source_id, message, context } => {
///             eprintln!("source {source_id} error in {context}: {message}");
///         }
///         other => println!("event: {other:?}"),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum AudioSourceEvent {
    /// An operation failed; emitted alongside the returned error.
    Error {
        /// Source that emitted the error.
        source_id: SourceId,
        /// Human-readable description, naming any computed limits.
        message: String,
        /// The operation that failed (e.g. `"push"`).
        context: String,
    },

    /// The source began turning on.
    Initializing {
        /// Source entering the initializing state.
        source_id: SourceId,
    },

    /// The source finished turning on and accepts attachments.
    Ready {
        /// Source that became ready.
        source_id: SourceId,
    },

    /// The source turned off; all sinks were closed.
    ///
    /// Emitted on every `turn_off` call, including redundant ones -
    /// listeners must not assume emission is suppressed when the source
    /// was already off.
    Off {
        /// Source that turned off.
        source_id: SourceId,
    },

    /// An attach began for the given node.
    AttachingStreamNode {
        /// Source being attached to.
        source_id: SourceId,
        /// Node requesting the attachment.
        node_id: NodeId,
    },

    /// An attach completed; the node's sink is filled and readable.
    AttachedStreamNode {
        /// Source that was attached to.
        source_id: SourceId,
        /// Node that is now attached.
        node_id: NodeId,
    },

    /// A node was detached and its sink closed.
    DetachedStreamNode {
        /// Source the node was detached from.
        source_id: SourceId,
        /// Node that was detached.
        node_id: NodeId,
    },
}

impl AudioSourceEvent {
    /// Returns the id of the source that emitted this event.
    pub fn source_id(&self) -> &SourceId {
        match self {
            Self::Error { source_id, .. }
            | Self::Initializing { source_id }
            | Self::Ready { source_id }
            | Self::Off { source_id }
            | Self::AttachingStreamNode { source_id, .. }
            | Self::AttachedStreamNode { source_id, .. }
            | Self::DetachedStreamNode { source_id, .. } => source_id,
        }
    }
}

/// Callback type for receiving source events.
///
/// Callbacks are invoked synchronously inside the emitting operation. A
/// panicking callback propagates out of that operation and can abort an
/// otherwise successful `push`/`attach`/`turn_off` - keep callbacks cheap
/// and infallible.
pub type EventCallback = Arc<dyn Fn(AudioSourceEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// Convenience for registering callbacks without wrapping in `Arc` by hand.
///
/// # Example
///
/// ```
/// use push_audio::{event_callback, AudioSourceEvent};
///
/// let callback = event_callback(|event| {
///     println!("got event: {event:?}");
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(AudioSourceEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Broadcast service shared between source instances.
///
/// Replaces an ambient process-wide listener registry with an explicit,
/// injectable value: construct one bus, hand its `Arc` to every source
/// built with [`AudioSourceBuilder::event_bus`](crate::AudioSourceBuilder::event_bus),
/// and its listeners observe every event from every one of those sources.
/// Sources built without an explicit bus get a fresh private one, keeping
/// instances independently testable.
///
/// The subscriber list is append-only; each listener observes events in
/// emission order.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use push_audio::{event_callback, AudioSource, EventBus};
///
/// let bus = Arc::new(EventBus::new());
/// bus.subscribe(event_callback(|event| {
///     println!("[{}] {event:?}", event.source_id());
/// }));
///
/// let source = AudioSource::builder().event_bus(bus.clone()).build();
/// # drop(source);
/// ```
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<EventCallback>>,
}

impl EventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Listeners cannot be removed.
    pub fn subscribe(&self, callback: EventCallback) {
        self.listeners.lock().push(callback);
    }

    /// Delivers an event to every listener, in registration order.
    ///
    /// The listener list is snapshotted before invocation, so a listener
    /// may subscribe new listeners without deadlocking; additions are
    /// observed from the next emission on. Listener panics are not caught.
    pub fn emit(&self, event: &AudioSourceEvent) {
        let listeners: Vec<EventCallback> = self.listeners.lock().clone();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_source_id_accessor() {
        let event = AudioSourceEvent::Ready {
            source_id: SourceId::new("s1"),
        };
        assert_eq!(event.source_id().as_str(), "s1");

        let event = AudioSourceEvent::DetachedStreamNode {
            source_id: SourceId::new("s2"),
            node_id: NodeId::new("n1"),
        };
        assert_eq!(event.source_id().as_str(), "s2");
    }

    #[test]
    fn test_event_callback_helper() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        let callback = event_callback(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        callback(AudioSourceEvent::Off {
            source_id: SourceId::new("s"),
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bus_delivers_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.subscribe(event_callback(move |_| order.lock().push(tag)));
        }

        bus.emit(&AudioSourceEvent::Ready {
            source_id: SourceId::new("s"),
        });
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_bus_listener_may_subscribe_during_emit() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));

        let bus_clone = bus.clone();
        let count_clone = count.clone();
        bus.subscribe(event_callback(move |_| {
            let count_inner = count_clone.clone();
            bus_clone.subscribe(event_callback(move |_| {
                count_inner.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        let event = AudioSourceEvent::Ready {
            source_id: SourceId::new("s"),
        };
        bus.emit(&event); // registers the inner listener
        assert_eq!(count.load(Ordering::SeqCst), 0);
        bus.emit(&event); // now the inner listener fires
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
