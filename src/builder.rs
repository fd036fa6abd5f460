//! Builder for [`AudioSource`].

use std::sync::Arc;

use crate::chunk::DEFAULT_CHUNK_SIZE;
use crate::event::{event_callback, AudioSourceEvent, EventBus, EventCallback};
use crate::format::AudioSourceFormat;
use crate::node::SourceId;
use crate::source::AudioSource;

/// Builder for configuring and constructing an [`AudioSource`].
///
/// Use [`AudioSource::builder()`] to create one. Every setting has a
/// default, so `build()` is infallible.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use push_audio::{AudioSource, AudioSourceFormat, EventBus};
///
/// let bus = Arc::new(EventBus::new());
///
/// let source = AudioSource::builder()
///     .id("meeting-audio")
///     .format(AudioSourceFormat::new(44100, 16, 2))
///     .chunk_size(8192)
///     .event_bus(bus)
///     .on_event(|event| tracing::debug!(?event, "audio source event"))
///     .build();
///
/// assert_eq!(source.id().as_str(), "meeting-audio");
/// ```
#[derive(Default)]
pub struct AudioSourceBuilder {
    id: Option<SourceId>,
    format: Option<AudioSourceFormat>,
    chunk_size: Option<usize>,
    bus: Option<Arc<EventBus>>,
    listeners: Vec<EventCallback>,
}

impl AudioSourceBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit source id.
    ///
    /// Default: a generated UUID v4.
    #[must_use]
    pub fn id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the audio format descriptor.
    ///
    /// Default: [`AudioSourceFormat::speech()`] (16kHz, 16-bit, mono).
    #[must_use]
    pub fn format(mut self, format: AudioSourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the chunk size used when writing buffers into sinks.
    ///
    /// Default: [`DEFAULT_CHUNK_SIZE`] (4096 bytes). A zero value is
    /// clamped to the default.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Sets the shared event bus this source broadcasts to.
    ///
    /// Pass the same `Arc` to several builders to observe all of their
    /// events through one subscriber list. Default: a fresh bus private to
    /// this source.
    #[must_use]
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Registers a private event listener. May be called repeatedly.
    #[must_use]
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(AudioSourceEvent) + Send + Sync + 'static,
    {
        self.listeners.push(event_callback(f));
        self
    }

    /// Constructs the source.
    #[must_use]
    pub fn build(self) -> AudioSource {
        let chunk_size = match self.chunk_size {
            Some(0) | None => DEFAULT_CHUNK_SIZE,
            Some(size) => size,
        };
        AudioSource::from_parts(
            self.id.unwrap_or_else(SourceId::generate),
            self.format.unwrap_or_default(),
            chunk_size,
            self.bus.unwrap_or_default(),
            self.listeners,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let source = AudioSource::builder().build();
        assert_eq!(source.format(), AudioSourceFormat::speech());
        assert!(!source.id().as_str().is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = AudioSource::builder().build();
        let b = AudioSource::builder().build();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_explicit_id() {
        let source = AudioSource::builder().id("my-source").build();
        assert_eq!(source.id().as_str(), "my-source");
    }

    #[tokio::test]
    async fn test_zero_chunk_size_clamped_to_default() {
        let source = AudioSource::builder().chunk_size(0).build();
        source.push(vec![0u8; DEFAULT_CHUNK_SIZE + 1]).await.unwrap();

        let node = source.attach("n").await.unwrap();
        let first = node.read().await.chunk().unwrap();
        assert_eq!(first.len(), DEFAULT_CHUNK_SIZE);
    }

    #[tokio::test]
    async fn test_custom_chunk_size() {
        let source = AudioSource::builder().chunk_size(100).build();
        source.push(vec![0u8; 250]).await.unwrap();

        let node = source.attach("n").await.unwrap();
        let mut sizes = Vec::new();
        while let Some(chunk) = node.read().await.chunk() {
            sizes.push(chunk.len());
        }
        assert_eq!(sizes, vec![100, 100, 50]);
    }
}
