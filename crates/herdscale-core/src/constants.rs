//! Shared constants for the tag acquisition and dispatch pipeline.
//!
//! These values centralize the geometry of the ISO 14443A request and
//! anti-collision exchanges and the timing defaults of the detection loop.
//! The timing constants are defaults; the station config may override them
//! within the documented bounds.

// ============================================================================
// Tag frame geometry
// ============================================================================

/// Number of identifier bytes in a tag UID.
///
/// The anti-collision cascade level 1 returns a 4-byte UID; the station
/// treats it as the animal's identity key.
pub const TAG_ID_LENGTH: usize = 4;

/// Expected length of a complete anti-collision response.
///
/// Four UID bytes followed by the BCC checksum byte (XOR of the four).
/// Responses of any other length are discarded before interpretation.
pub const ANTICOLLISION_FRAME_LENGTH: usize = 5;

/// Expected length of the answer-to-request (ATQA) response.
///
/// A tag answering the idle request replies with exactly two bytes;
/// anything else fails the request phase.
pub const REQUEST_RESPONSE_LENGTH: usize = 2;

/// Canonical rendered length of a tag identifier.
///
/// Tag identifiers travel as uppercase zero-padded hex of the 4 UID bytes.
pub const TAG_HEX_LENGTH: usize = TAG_ID_LENGTH * 2;

// ============================================================================
// Detection loop timing
// ============================================================================

/// Default polling cadence of the detection dispatcher (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default cooldown before the same tag counts as a new detection
/// (milliseconds).
///
/// Within this window, repeated reads of the tag that was just accepted are
/// suppressed; a different tag is always accepted immediately.
pub const DEFAULT_COOLDOWN_MS: u64 = 5000;

/// Default settle delay between a detection and the camera capture
/// (milliseconds). Gives the animal time to position itself in frame.
pub const DEFAULT_CAPTURE_DELAY_MS: u64 = 500;

/// Default elapsed-time bound on a single transceive wait (milliseconds).
///
/// The reader chip signals completion through its IRQ register; this is the
/// wall-clock ceiling on polling that register before the attempt is
/// abandoned as "no tag".
pub const DEFAULT_TRANSCEIVE_TIMEOUT_MS: u64 = 25;

// ============================================================================
// Report client timing
// ============================================================================

/// Default timeout for report submission I/O (milliseconds).
pub const DEFAULT_REPORT_TIMEOUT_MS: u64 = 3000;

/// Minimum allowed report timeout (milliseconds).
///
/// Values below this cause spurious timeouts even on fast local networks.
pub const MIN_REPORT_TIMEOUT_MS: u64 = 500;

/// Maximum allowed report timeout (milliseconds).
///
/// The dispatch cycle is synchronous; a slower server must not stall the
/// detection loop for longer than this.
pub const MAX_REPORT_TIMEOUT_MS: u64 = 10000;

// ============================================================================
// Device identification
// ============================================================================

/// Minimum device ID length (characters).
pub const MIN_DEVICE_ID_LENGTH: usize = 3;

/// Maximum device ID length (characters).
pub const MAX_DEVICE_ID_LENGTH: usize = 32;
