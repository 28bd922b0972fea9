//! Common types shared across hardware collaborator implementations.

use bytes::Bytes;
use std::time::Duration;

/// A captured camera frame.
///
/// Holds the encoded image bytes (JPEG on the reference hardware). The
/// buffer is reference-counted ([`Bytes`]) so it can be handed to the
/// report client without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    bytes: Bytes,
}

impl ImageData {
    /// Wrap an encoded image buffer.
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Wrap an owned byte vector.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(bytes),
        }
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the capture produced no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the underlying buffer (cheap, no copy).
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Visual feedback events for the station's status indicator.
///
/// The reference hardware drives a single LED; each signal maps to a blink
/// pattern. Richer indicators (buzzer, display) can interpret the same
/// events differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Signal {
    /// Startup complete, waiting for detections.
    Ready,

    /// A tag was accepted as a new detection event.
    TagDetected,

    /// Capture report delivered to the server.
    ReportDelivered,

    /// Camera failed to produce a frame.
    CaptureFailed,

    /// Report submission failed.
    ReportFailed,
}

impl Signal {
    /// Blink pattern for a single-LED indicator: (pulse count, pulse width).
    ///
    /// Patterns follow the station's field convention: slow pulses are
    /// good news, fast bursts are faults.
    #[must_use]
    pub fn blink_pattern(&self) -> (u8, Duration) {
        match self {
            Signal::Ready => (3, Duration::from_millis(200)),
            Signal::TagDetected => (2, Duration::from_millis(100)),
            Signal::ReportDelivered => (1, Duration::from_millis(500)),
            Signal::CaptureFailed => (5, Duration::from_millis(50)),
            Signal::ReportFailed => (3, Duration::from_millis(100)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_len() {
        let image = ImageData::from_vec(vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(image.len(), 4);
        assert!(!image.is_empty());
    }

    #[test]
    fn test_image_data_into_bytes_preserves_content() {
        let image = ImageData::from_vec(vec![1, 2, 3]);
        assert_eq!(image.clone().into_bytes().as_ref(), &[1, 2, 3]);
        assert_eq!(image.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_fault_signals_are_fast_bursts() {
        let (count, width) = Signal::CaptureFailed.blink_pattern();
        assert!(count >= 3);
        assert!(width < Duration::from_millis(200));
    }
}
