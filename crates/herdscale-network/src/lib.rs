//! Capture-report transport for the Herdscale station.
//!
//! The station ships one frame per accepted detection to the estimation
//! server and reads one acknowledgment back. The wire format is a
//! length-prefixed binary frame: a JSON envelope with the capture metadata
//! followed by the raw JPEG body — the image travels as bytes, not as a
//! text encoding.
//!
//! # Architecture
//!
//! ```text
//! CapturePipeline
//!     │
//!     └─> ReportClient ───(TCP)───> Estimation Server
//!            │
//!            └─> ReportCodec (framing, envelope encoding)
//! ```
//!
//! # Design principles
//!
//! The client is a thin transport layer in the manner of a single-purpose
//! field device:
//! - **No automatic retry**: a failed report is a failed report; the
//!   dispatcher's cooldown semantics already decided this detection was
//!   handled.
//! - **No pooling**: one connection per station.
//! - **Timeouts everywhere**: connect, send, and receive are all bounded,
//!   because the dispatch cycle is synchronous and must never stall on a
//!   slow server.

pub mod client;
pub mod codec;
pub mod message;

pub use client::{ReportClient, ReportClientConfig, ReportClientError};
pub use codec::{CodecError, ReportCodec};
pub use message::{CaptureReport, ReportAck};
