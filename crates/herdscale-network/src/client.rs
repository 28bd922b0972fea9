//! TCP client for capture-report submission.
//!
//! Connects the station to the estimation server and pushes one framed
//! report per accepted detection, reading one acknowledgment back per
//! report. Framing is handled by [`ReportCodec`]; every I/O operation is
//! wrapped in a timeout so a slow or dead server can never stall the
//! dispatch loop beyond its configured bound.
//!
//! Retry policy deliberately lives with the caller: the client reports
//! failures, the pipeline decides whether this detection's report is lost
//! or the connection is worth reopening for the next one.

use crate::codec::{CodecError, ReportCodec};
use crate::message::{CaptureReport, ReportAck};
use futures::{SinkExt, StreamExt};
use herdscale_core::constants::DEFAULT_REPORT_TIMEOUT_MS;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// Configuration for the report client.
#[derive(Debug, Clone)]
pub struct ReportClientConfig {
    /// Estimation server address.
    pub server_addr: SocketAddr,

    /// Timeout for each I/O operation (connect, send, recv).
    pub timeout: Duration,
}

impl Default for ReportClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:4700".parse().expect("static address parses"),
            timeout: Duration::from_millis(DEFAULT_REPORT_TIMEOUT_MS),
        }
    }
}

/// Errors that can occur during report client operations.
#[derive(Debug, Error)]
pub enum ReportClientError {
    /// Client is not connected to the server.
    #[error("Not connected to server")]
    NotConnected,

    /// Connection attempt timed out.
    #[error("Connection timeout after {0}ms")]
    ConnectionTimeout(u64),

    /// Waiting for the acknowledgment timed out.
    #[error("Read timeout after {0}ms")]
    ReadTimeout(u64),

    /// Sending the report timed out.
    #[error("Write timeout after {0}ms")]
    WriteTimeout(u64),

    /// Connection was lost during an operation.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Framing or envelope error.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// TCP client for capture-report submission.
///
/// # Connection lifecycle
///
/// 1. Create with [`new`](ReportClient::new)
/// 2. Connect with [`connect`](ReportClient::connect)
/// 3. Submit reports with [`submit`](ReportClient::submit)
/// 4. Close with [`close`](ReportClient::close)
///
/// A lost connection leaves the client disconnected; the caller may call
/// [`connect`](ReportClient::connect) again.
pub struct ReportClient {
    config: ReportClientConfig,
    framed: Option<Framed<TcpStream, ReportCodec>>,
}

impl ReportClient {
    /// Create a disconnected client.
    pub fn new(config: ReportClientConfig) -> Self {
        Self {
            config,
            framed: None,
        }
    }

    /// Whether a connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Connect to the estimation server.
    ///
    /// Replaces any existing connection.
    ///
    /// # Errors
    ///
    /// [`ReportClientError::ConnectionTimeout`] when the server does not
    /// accept within the configured timeout; I/O errors pass through.
    pub async fn connect(&mut self) -> Result<(), ReportClientError> {
        debug!(addr = %self.config.server_addr, "connecting to estimation server");

        let stream = tokio::time::timeout(
            self.config.timeout,
            TcpStream::connect(self.config.server_addr),
        )
        .await
        .map_err(|_| ReportClientError::ConnectionTimeout(self.config.timeout.as_millis() as u64))??;

        self.framed = Some(Framed::new(stream, ReportCodec::new()));
        info!(addr = %self.config.server_addr, "connected to estimation server");
        Ok(())
    }

    /// Submit one report and wait for the acknowledgment.
    ///
    /// # Errors
    ///
    /// [`ReportClientError::NotConnected`] without a connection;
    /// write/read timeouts per the configured bound;
    /// [`ReportClientError::ConnectionLost`] when the server closes the
    /// stream before acknowledging. Any transport error leaves the client
    /// disconnected.
    pub async fn submit(
        &mut self,
        report: CaptureReport,
    ) -> Result<ReportAck, ReportClientError> {
        let timeout = self.config.timeout;
        let framed = self.framed.as_mut().ok_or(ReportClientError::NotConnected)?;

        debug!(
            report_id = %report.report_id,
            tag = %report.tag,
            image_len = report.image.len(),
            "submitting capture report"
        );

        let sent = tokio::time::timeout(timeout, framed.send(report))
            .await
            .map_err(|_| ReportClientError::WriteTimeout(timeout.as_millis() as u64));
        match sent {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.framed = None;
                return Err(e.into());
            }
            Err(e) => {
                self.framed = None;
                return Err(e);
            }
        }

        let received = tokio::time::timeout(timeout, framed.next())
            .await
            .map_err(|_| ReportClientError::ReadTimeout(timeout.as_millis() as u64));
        match received {
            Ok(Some(Ok(ack))) => {
                debug!(accepted = ack.accepted, "acknowledgment received");
                Ok(ack)
            }
            Ok(Some(Err(e))) => {
                self.framed = None;
                Err(e.into())
            }
            Ok(None) => {
                self.framed = None;
                Err(ReportClientError::ConnectionLost(
                    "server closed the connection before acknowledging".to_string(),
                ))
            }
            Err(e) => {
                self.framed = None;
                Err(e)
            }
        }
    }

    /// Close the connection. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut framed) = self.framed.take() {
            if let Err(e) = framed.get_mut().shutdown().await {
                warn!("error during connection shutdown: {e}");
            }
            info!("disconnected from estimation server");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use herdscale_core::{CameraPosition, DeviceId};

    fn sample_report() -> CaptureReport {
        CaptureReport::new(
            DeviceId::new("station-01").unwrap(),
            CameraPosition::Front,
            "04A1B2C3".parse().unwrap(),
            Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]),
        )
    }

    #[tokio::test]
    async fn test_submit_without_connection() {
        let mut client = ReportClient::new(ReportClientConfig::default());
        let result = client.submit(sample_report()).await;
        assert!(matches!(result, Err(ReportClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_when_disconnected() {
        let mut client = ReportClient::new(ReportClientConfig::default());
        client.close().await;
        client.close().await;
        assert!(!client.is_connected());
    }
}
