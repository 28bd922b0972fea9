//! Collaborator trait definitions.
//!
//! These traits establish the contract between the detection core and the
//! station peripherals, enabling substitution between mock and real
//! hardware. All methods are native `async fn` (Edition 2024 RPITIT).

use crate::error::Result;
use crate::types::{ImageData, Signal};
use herdscale_core::TagId;

/// A contactless tag reader.
///
/// One operation: attempt to read a tag identifier from the field. The
/// read is bounded in elapsed time — an implementation must return within
/// its configured timeout even when the chip never signals completion, so
/// the polling loop can never stall on a single attempt.
///
/// # Return contract
///
/// `None` covers both "no tag present" and every recoverable protocol
/// failure (timeout, bad checksum, unexpected frame length). Callers get a
/// debounced yes/no signal and must tolerate this intentional collapse; a
/// tag that is physically present but unreadable looks identical to an
/// empty field.
pub trait TagReader {
    /// Run one self-contained read attempt.
    async fn attempt_read(&mut self) -> Option<TagId>;
}

/// A station camera.
///
/// Invoked once per accepted detection event. The core only calls it and
/// interprets a present/absent result; an `Err` means "skip reporting and
/// signal the fault" without altering detection state.
pub trait Camera {
    /// Capture a single encoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HardwareError`] when the sensor produces no frame
    /// or the capture backend fails.
    async fn capture(&mut self) -> Result<ImageData>;
}

/// A status indicator (LED on the reference hardware).
///
/// Signaling is best-effort: callers typically ignore the result
/// (`indicator.signal(..).await.ok()`), since losing a blink must never
/// fail a dispatch cycle.
pub trait StatusIndicator {
    /// Emit a visual signal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HardwareError`] when the indicator hardware is
    /// unreachable.
    async fn signal(&mut self, signal: Signal) -> Result<()>;
}
