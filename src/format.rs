//! Audio format descriptor and device metadata.

/// Seconds of audio a single pushed buffer may carry.
const MAX_BUFFER_SECONDS: usize = 600;

/// Fixed header allowance added on top of the ten-minute audio budget.
const HEADER_ALLOWANCE_BYTES: usize = 44;

/// Immutable audio format descriptor supplied at source construction.
///
/// The format is a read-only value object: it determines the admission
/// limit for pushed buffers and answers [`device_info`](crate::AudioSource::device_info)
/// queries, nothing else. The source never inspects or converts sample data.
///
/// # Example
///
/// ```
/// use push_audio::AudioSourceFormat;
///
/// let format = AudioSourceFormat::speech();
/// assert_eq!(format.samples_per_sec, 16000);
/// assert_eq!(format.max_allowed_bytes(), 16000 * 600 + 44);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSourceFormat {
    /// Sample rate in Hz (e.g., 16000, 44100, 48000).
    pub samples_per_sec: u32,

    /// Bits per sample (e.g., 16).
    pub bits_per_sample: u16,

    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
}

impl AudioSourceFormat {
    /// Creates a format descriptor with the given parameters.
    pub fn new(samples_per_sec: u32, bits_per_sample: u16, channels: u16) -> Self {
        Self {
            samples_per_sec,
            bits_per_sample,
            channels,
        }
    }

    /// 16kHz 16-bit mono - the format speech-to-text services prefer.
    pub fn speech() -> Self {
        Self::new(16000, 16, 1)
    }

    /// Returns the admission limit in bytes for a single pushed buffer.
    ///
    /// Ten minutes of audio at the configured sample rate plus a fixed
    /// header allowance. Buffers larger than this are rejected by
    /// [`push`](crate::AudioSource::push) before entering the queue.
    #[must_use]
    pub fn max_allowed_bytes(&self) -> usize {
        self.samples_per_sec as usize * MAX_BUFFER_SECONDS + HEADER_ALLOWANCE_BYTES
    }
}

impl Default for AudioSourceFormat {
    fn default() -> Self {
        Self::speech()
    }
}

/// Connectivity classification reported by [`AudioDeviceInfo`].
///
/// An in-memory source has no physical transport, so connectivity is
/// always reported as [`Unknown`](Connectivity::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Connectivity cannot be determined for this source type.
    #[default]
    Unknown,
}

/// Device classification reported by [`AudioDeviceInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// Pre-recorded data fed from memory, as opposed to a live capture device.
    #[default]
    File,
}

/// Descriptive snapshot of the source viewed as an input device.
///
/// Returned by [`AudioSource::device_info`](crate::AudioSource::device_info)
/// for consumers that expect device metadata from every audio source
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioDeviceInfo {
    /// Bits per sample of the configured format.
    pub bits_per_sample: u16,

    /// Channel count of the configured format.
    pub channels: u16,

    /// Sample rate of the configured format in Hz.
    pub sample_rate: u32,

    /// Always [`Connectivity::Unknown`] for an in-memory source.
    pub connectivity: Connectivity,

    /// Always [`DeviceKind::File`] for an in-memory source.
    pub kind: DeviceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_preset() {
        let format = AudioSourceFormat::speech();
        assert_eq!(format.samples_per_sec, 16000);
        assert_eq!(format.bits_per_sample, 16);
        assert_eq!(format.channels, 1);
    }

    #[test]
    fn test_default_is_speech() {
        assert_eq!(AudioSourceFormat::default(), AudioSourceFormat::speech());
    }

    #[test]
    fn test_max_allowed_bytes_scales_with_sample_rate() {
        let low = AudioSourceFormat::new(8000, 16, 1);
        let high = AudioSourceFormat::new(48000, 16, 2);
        assert_eq!(low.max_allowed_bytes(), 8000 * 600 + 44);
        assert_eq!(high.max_allowed_bytes(), 48000 * 600 + 44);
    }

    #[test]
    fn test_device_info_defaults() {
        assert_eq!(Connectivity::default(), Connectivity::Unknown);
        assert_eq!(DeviceKind::default(), DeviceKind::File);
    }
}
