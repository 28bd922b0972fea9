//! Tokio codec for capture-report framing.
//!
//! Outbound frames (station → server) are
//! `[u32 envelope_len][envelope JSON][u32 image_len][image bytes]`,
//! lengths big-endian. Inbound frames (server → station) are
//! `[u32 len][acknowledgment JSON]`. Length prefixes keep the parse
//! single-pass and let the receiver pre-size its buffers; JSON keeps the
//! metadata inspectable on the wire.

use crate::message::{CaptureReport, ReportAck};
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum acknowledgment frame size in bytes (64 KB).
///
/// Acks are a few hundred bytes of JSON; the limit only exists so a
/// misbehaving peer cannot make the station buffer unbounded input.
const DEFAULT_MAX_ACK_SIZE: usize = 64 * 1024;

/// Maximum image body size in bytes (8 MiB).
///
/// A UXGA JPEG from the station camera is well under 1 MiB; anything
/// larger than this is a capture gone wrong, not a legitimate frame.
const MAX_IMAGE_SIZE: usize = 8 * 1024 * 1024;

/// Errors raised while encoding or decoding report frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A frame length prefix exceeds the configured bound.
    #[error("Frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// The JSON envelope could not be encoded or decoded.
    #[error("Envelope error: {0}")]
    Envelope(#[from] serde_json::Error),

    /// Low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Codec pairing [`Encoder<CaptureReport>`] with a [`ReportAck`] decoder.
#[derive(Debug)]
pub struct ReportCodec {
    max_ack_size: usize,
}

impl ReportCodec {
    /// Create a codec with the default bounds.
    pub fn new() -> Self {
        Self {
            max_ack_size: DEFAULT_MAX_ACK_SIZE,
        }
    }
}

impl Default for ReportCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<CaptureReport> for ReportCodec {
    type Error = CodecError;

    fn encode(&mut self, report: CaptureReport, dst: &mut BytesMut) -> Result<(), CodecError> {
        if report.image.len() > MAX_IMAGE_SIZE {
            return Err(CodecError::FrameTooLarge {
                size: report.image.len(),
                max: MAX_IMAGE_SIZE,
            });
        }

        let envelope = serde_json::to_vec(&report.envelope())?;

        dst.reserve(4 + envelope.len() + 4 + report.image.len());
        dst.put_u32(envelope.len() as u32);
        dst.put_slice(&envelope);
        dst.put_u32(report.image.len() as u32);
        dst.put_slice(&report.image);
        Ok(())
    }
}

impl Decoder for ReportCodec {
    type Item = ReportAck;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ReportAck>, CodecError> {
        if src.len() < 4 {
            return Ok(None);
        }

        let len = u32::from_be_bytes(src[..4].try_into().expect("length prefix is 4 bytes"))
            as usize;
        if len > self.max_ack_size {
            return Err(CodecError::FrameTooLarge {
                size: len,
                max: self.max_ack_size,
            });
        }

        if src.len() < 4 + len {
            // Partial frame; ask for the rest.
            src.reserve(4 + len - src.len());
            return Ok(None);
        }

        src.advance(4);
        let frame = src.split_to(len);
        let ack = serde_json::from_slice(&frame)?;
        Ok(Some(ack))
    }
}
