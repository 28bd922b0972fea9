//! Mock camera implementation for testing and development.

use crate::{HardwareError, Result, traits::Camera, types::ImageData};
use std::collections::VecDeque;

/// Minimal JPEG marker sequence used as the canned capture payload.
const CANNED_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

/// Scripted capture outcome for [`MockCamera`].
#[derive(Debug, Clone)]
enum CaptureOutcome {
    Image(ImageData),
    Failure,
}

/// Mock camera with scriptable capture outcomes.
///
/// By default every capture succeeds with a canned JPEG payload. Individual
/// outcomes can be queued with [`push_image`](MockCamera::push_image) and
/// [`push_failure`](MockCamera::push_failure); queued outcomes are consumed
/// in order before the default applies again.
#[derive(Debug)]
pub struct MockCamera {
    script: VecDeque<CaptureOutcome>,
    default: CaptureOutcome,
}

impl MockCamera {
    /// Camera whose captures always succeed with a canned frame.
    pub fn always_ok() -> Self {
        Self {
            script: VecDeque::new(),
            default: CaptureOutcome::Image(ImageData::from_vec(CANNED_JPEG.to_vec())),
        }
    }

    /// Camera whose captures always fail.
    pub fn failing() -> Self {
        Self {
            script: VecDeque::new(),
            default: CaptureOutcome::Failure,
        }
    }

    /// Queue a successful capture returning the given frame.
    pub fn push_image(&mut self, image: ImageData) {
        self.script.push_back(CaptureOutcome::Image(image));
    }

    /// Queue a failing capture.
    pub fn push_failure(&mut self) {
        self.script.push_back(CaptureOutcome::Failure);
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::always_ok()
    }
}

impl Camera for MockCamera {
    async fn capture(&mut self) -> Result<ImageData> {
        let outcome = self.script.pop_front().unwrap_or(self.default.clone());
        match outcome {
            CaptureOutcome::Image(image) => Ok(image),
            CaptureOutcome::Failure => Err(HardwareError::capture("scripted capture failure")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_capture_succeeds() {
        let mut camera = MockCamera::always_ok();
        let image = camera.capture().await.unwrap();
        assert!(!image.is_empty());
    }

    #[tokio::test]
    async fn test_failing_camera() {
        let mut camera = MockCamera::failing();
        assert!(camera.capture().await.is_err());
    }

    #[tokio::test]
    async fn test_scripted_outcomes_consumed_in_order() {
        let mut camera = MockCamera::always_ok();
        camera.push_failure();
        camera.push_image(ImageData::from_vec(vec![0xAA]));

        assert!(camera.capture().await.is_err());
        assert_eq!(camera.capture().await.unwrap().as_bytes(), &[0xAA]);

        // Script drained; default applies again
        assert!(camera.capture().await.is_ok());
    }
}
