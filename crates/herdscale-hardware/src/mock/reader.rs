//! Mock tag reader implementation for testing and development.

use crate::{Result, traits::TagReader};
use herdscale_core::TagId;
use tokio::sync::mpsc;

/// Mock tag reader driven by a companion handle.
///
/// The reader polls a channel instead of an RF field: every tag presented
/// through the [`MockTagReaderHandle`] is returned by exactly one
/// subsequent [`TagReader::attempt_read`] call, and an empty channel reads
/// as "no tag in field" — the same shape a real polling cycle sees.
///
/// # Examples
///
/// ```
/// use herdscale_hardware::mock::MockTagReader;
/// use herdscale_hardware::traits::TagReader;
/// use herdscale_core::TagId;
///
/// #[tokio::main]
/// async fn main() -> herdscale_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new();
///
///     // Nothing in the field yet
///     assert_eq!(reader.attempt_read().await, None);
///
///     handle.present_tag(TagId::from_bytes([0x04, 0xA1, 0xB2, 0xC3])).await?;
///     let tag = reader.attempt_read().await.unwrap();
///     assert_eq!(tag.to_string(), "04A1B2C3");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    reads: mpsc::Receiver<TagId>,
}

impl MockTagReader {
    /// Create a mock reader and the handle that feeds it.
    pub fn new() -> (Self, MockTagReaderHandle) {
        let (tx, rx) = mpsc::channel(32);
        (Self { reads: rx }, MockTagReaderHandle { tx })
    }
}

impl TagReader for MockTagReader {
    async fn attempt_read(&mut self) -> Option<TagId> {
        self.reads.try_recv().ok()
    }
}

/// Handle for presenting tags to a [`MockTagReader`].
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    tx: mpsc::Sender<TagId>,
}

impl MockTagReaderHandle {
    /// Present a tag to the reader's field.
    ///
    /// The tag is consumed by the next `attempt_read` call.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_tag(&self, tag: TagId) -> Result<()> {
        self.tx
            .send(tag)
            .await
            .map_err(|_| crate::HardwareError::disconnected("mock tag reader"))
    }
}
