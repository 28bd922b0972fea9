//! The capture-and-report collaborator.
//!
//! This is the detection handler the dispatcher invokes: signal the
//! detection, let the animal settle, capture a frame, ship the report,
//! and translate whatever happened into an opaque outcome. Debounce state
//! never depends on anything here — a failed capture or report still
//! consumed the detection.

use herdscale_core::{CameraPosition, DeviceId, TagId};
use herdscale_dispatch::{DetectionHandler, HandlerOutcome};
use herdscale_hardware::{Camera, Signal, StatusIndicator};
use herdscale_network::{CaptureReport, ReportAck, ReportClient, ReportClientError};
use std::time::Duration;
use tracing::{info, warn};

/// Transport seam for report submission, so the pipeline is testable
/// without a TCP server.
pub trait ReportTransport {
    /// Make sure a connection is available, reopening a dropped one.
    async fn ensure_connected(&mut self) -> Result<(), ReportClientError>;

    /// Deliver one report and return the server's acknowledgment.
    async fn deliver(&mut self, report: CaptureReport) -> Result<ReportAck, ReportClientError>;
}

impl ReportTransport for ReportClient {
    async fn ensure_connected(&mut self) -> Result<(), ReportClientError> {
        if self.is_connected() {
            Ok(())
        } else {
            self.connect().await
        }
    }

    async fn deliver(&mut self, report: CaptureReport) -> Result<ReportAck, ReportClientError> {
        self.submit(report).await
    }
}

/// Capture-and-report pipeline invoked per accepted detection.
pub struct CapturePipeline<C, I, T> {
    camera: C,
    indicator: I,
    transport: T,
    device_id: DeviceId,
    camera_position: CameraPosition,
    capture_delay: Duration,
}

impl<C, I, T> CapturePipeline<C, I, T> {
    pub fn new(
        camera: C,
        indicator: I,
        transport: T,
        device_id: DeviceId,
        camera_position: CameraPosition,
        capture_delay: Duration,
    ) -> Self {
        Self {
            camera,
            indicator,
            transport,
            device_id,
            camera_position,
            capture_delay,
        }
    }
}

impl<C, I, T> DetectionHandler for CapturePipeline<C, I, T>
where
    C: Camera,
    I: StatusIndicator,
    T: ReportTransport,
{
    async fn on_detection(&mut self, tag: &TagId) -> HandlerOutcome {
        self.indicator.signal(Signal::TagDetected).await.ok();

        // Give the animal time to settle into the frame.
        if !self.capture_delay.is_zero() {
            tokio::time::sleep(self.capture_delay).await;
        }

        let image = match self.camera.capture().await {
            Ok(image) => image,
            Err(e) => {
                warn!(%tag, "capture failed: {e}");
                self.indicator.signal(Signal::CaptureFailed).await.ok();
                return HandlerOutcome::CaptureFailed;
            }
        };

        let report = CaptureReport::new(
            self.device_id.clone(),
            self.camera_position,
            *tag,
            image.into_bytes(),
        );

        // One reconnect attempt per detection; a send itself is never
        // retried.
        if let Err(e) = self.transport.ensure_connected().await {
            warn!(%tag, "report connection unavailable: {e}");
            self.indicator.signal(Signal::ReportFailed).await.ok();
            return HandlerOutcome::ReportFailed;
        }

        match self.transport.deliver(report).await {
            Ok(ack) if ack.accepted => {
                if let Some(kg) = ack.estimated_weight {
                    info!(%tag, weight_kg = kg, "weight estimate received");
                }
                self.indicator.signal(Signal::ReportDelivered).await.ok();
                HandlerOutcome::Completed {
                    estimated_weight: ack.estimated_weight,
                }
            }
            Ok(ack) => {
                warn!(%tag, message = ?ack.message, "server rejected capture report");
                self.indicator.signal(Signal::ReportFailed).await.ok();
                HandlerOutcome::ReportFailed
            }
            Err(e) => {
                warn!(%tag, "report submission failed: {e}");
                self.indicator.signal(Signal::ReportFailed).await.ok();
                HandlerOutcome::ReportFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herdscale_hardware::mock::{MockCamera, MockIndicator};
    use std::collections::VecDeque;

    struct MockTransport {
        reports: Vec<CaptureReport>,
        responses: VecDeque<Result<ReportAck, ReportClientError>>,
        fail_connect: bool,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                reports: Vec::new(),
                responses: VecDeque::new(),
                fail_connect: false,
            }
        }

        fn accepted_ack(weight: Option<f64>) -> ReportAck {
            ReportAck {
                accepted: true,
                estimated_weight: weight,
                message: None,
            }
        }
    }

    impl ReportTransport for &mut MockTransport {
        async fn ensure_connected(&mut self) -> Result<(), ReportClientError> {
            if self.fail_connect {
                Err(ReportClientError::NotConnected)
            } else {
                Ok(())
            }
        }

        async fn deliver(
            &mut self,
            report: CaptureReport,
        ) -> Result<ReportAck, ReportClientError> {
            self.reports.push(report);
            self.responses
                .pop_front()
                .unwrap_or_else(|| Ok(MockTransport::accepted_ack(None)))
        }
    }

    fn tag(s: &str) -> TagId {
        s.parse().unwrap()
    }

    fn pipeline<'a>(
        camera: MockCamera,
        transport: &'a mut MockTransport,
    ) -> (
        CapturePipeline<MockCamera, MockIndicator, &'a mut MockTransport>,
        herdscale_hardware::mock::MockIndicatorHandle,
    ) {
        let (indicator, handle) = MockIndicator::new();
        let pipeline = CapturePipeline::new(
            camera,
            indicator,
            transport,
            DeviceId::new("station-01").unwrap(),
            CameraPosition::Front,
            Duration::ZERO,
        );
        (pipeline, handle)
    }

    #[tokio::test]
    async fn test_successful_detection_reports_and_signals() {
        let mut transport = MockTransport::new();
        transport
            .responses
            .push_back(Ok(MockTransport::accepted_ack(Some(412.5))));

        let (mut pipeline, signals) = pipeline(MockCamera::always_ok(), &mut transport);
        let outcome = pipeline.on_detection(&tag("04A1B2C3")).await;

        assert_eq!(
            outcome,
            HandlerOutcome::Completed {
                estimated_weight: Some(412.5)
            }
        );
        assert_eq!(
            signals.signals(),
            vec![Signal::TagDetected, Signal::ReportDelivered]
        );

        assert_eq!(transport.reports.len(), 1);
        let report = &transport.reports[0];
        assert_eq!(report.tag, tag("04A1B2C3"));
        assert_eq!(report.device_id.as_str(), "STATION-01");
        assert!(!report.image.is_empty());
    }

    #[tokio::test]
    async fn test_capture_failure_skips_reporting() {
        let mut transport = MockTransport::new();
        let (mut pipeline, signals) = pipeline(MockCamera::failing(), &mut transport);

        let outcome = pipeline.on_detection(&tag("04A1B2C3")).await;

        assert_eq!(outcome, HandlerOutcome::CaptureFailed);
        assert_eq!(
            signals.signals(),
            vec![Signal::TagDetected, Signal::CaptureFailed]
        );
        assert!(transport.reports.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_report() {
        let mut transport = MockTransport::new();
        transport.fail_connect = true;

        let (mut pipeline, signals) = pipeline(MockCamera::always_ok(), &mut transport);
        let outcome = pipeline.on_detection(&tag("04A1B2C3")).await;

        assert_eq!(outcome, HandlerOutcome::ReportFailed);
        assert_eq!(
            signals.signals(),
            vec![Signal::TagDetected, Signal::ReportFailed]
        );
        assert!(transport.reports.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_fails_report() {
        let mut transport = MockTransport::new();
        transport
            .responses
            .push_back(Err(ReportClientError::ConnectionLost("reset".into())));

        let (mut pipeline, signals) = pipeline(MockCamera::always_ok(), &mut transport);
        let outcome = pipeline.on_detection(&tag("04A1B2C3")).await;

        assert_eq!(outcome, HandlerOutcome::ReportFailed);
        assert_eq!(
            signals.signals(),
            vec![Signal::TagDetected, Signal::ReportFailed]
        );
    }

    #[tokio::test]
    async fn test_server_rejection_fails_report() {
        let mut transport = MockTransport::new();
        transport.responses.push_back(Ok(ReportAck {
            accepted: false,
            estimated_weight: None,
            message: Some("unknown tag".into()),
        }));

        let (mut pipeline, _signals) = pipeline(MockCamera::always_ok(), &mut transport);
        let outcome = pipeline.on_detection(&tag("04A1B2C3")).await;

        assert_eq!(outcome, HandlerOutcome::ReportFailed);
    }
}
