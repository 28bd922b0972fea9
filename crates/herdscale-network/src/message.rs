//! Report messages exchanged with the estimation server.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use herdscale_core::{CameraPosition, DeviceId, TagId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One capture shipped to the estimation server.
///
/// The metadata travels as a JSON envelope; the image body is appended to
/// the frame as raw bytes (see [`crate::ReportCodec`] for the framing).
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// Unique id of this report, minted at capture time.
    pub report_id: Uuid,

    /// Which station produced the capture.
    pub device_id: DeviceId,

    /// Camera placement; the server weighs the silhouette per viewpoint.
    pub camera_position: CameraPosition,

    /// The detected tag.
    pub tag: TagId,

    /// When the frame was captured.
    pub captured_at: DateTime<Utc>,

    /// Encoded JPEG body.
    pub image: Bytes,
}

impl CaptureReport {
    /// Assemble a report for a fresh capture, stamped now.
    pub fn new(
        device_id: DeviceId,
        camera_position: CameraPosition,
        tag: TagId,
        image: Bytes,
    ) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            device_id,
            camera_position,
            tag,
            captured_at: Utc::now(),
            image,
        }
    }

    /// The JSON-serializable metadata of this report.
    pub(crate) fn envelope(&self) -> ReportEnvelope {
        ReportEnvelope {
            report_id: self.report_id,
            device_id: self.device_id.clone(),
            camera_position: self.camera_position,
            tag: self.tag,
            captured_at: self.captured_at,
            image_len: self.image.len() as u64,
        }
    }
}

/// Wire envelope of a [`CaptureReport`]: everything but the image body,
/// plus the body's length so the receiver can frame it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ReportEnvelope {
    pub report_id: Uuid,
    pub device_id: DeviceId,
    pub camera_position: CameraPosition,
    pub tag: TagId,
    pub captured_at: DateTime<Utc>,
    pub image_len: u64,
}

/// Server acknowledgment of a capture report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAck {
    /// Whether the server accepted and stored the capture.
    pub accepted: bool,

    /// Weight estimate in kilograms, when the server could compute one.
    /// Surfaced to the operator's indicator/log only; the station never
    /// interprets it.
    #[serde(default)]
    pub estimated_weight: Option<f64>,

    /// Optional human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> CaptureReport {
        CaptureReport::new(
            DeviceId::new("station-01").unwrap(),
            CameraPosition::Front,
            "04A1B2C3".parse().unwrap(),
            Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]),
        )
    }

    #[test]
    fn test_envelope_carries_image_length() {
        let report = report();
        let envelope = report.envelope();
        assert_eq!(envelope.image_len, 4);
        assert_eq!(envelope.tag, report.tag);
    }

    #[test]
    fn test_envelope_serializes_tag_as_hex() {
        let json = serde_json::to_value(report().envelope()).unwrap();
        assert_eq!(json["tag"], "04A1B2C3");
        assert_eq!(json["camera_position"], "front");
        assert_eq!(json["device_id"], "STATION-01");
    }

    #[test]
    fn test_ack_tolerates_minimal_payload() {
        let ack: ReportAck = serde_json::from_str(r#"{"accepted":true}"#).unwrap();
        assert!(ack.accepted);
        assert_eq!(ack.estimated_weight, None);
        assert_eq!(ack.message, None);
    }

    #[test]
    fn test_ack_roundtrip_with_weight() {
        let ack = ReportAck {
            accepted: true,
            estimated_weight: Some(412.5),
            message: Some("ok".to_string()),
        };
        let json = serde_json::to_string(&ack).unwrap();
        let back: ReportAck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ack);
    }
}
