//! Loopback integration tests for the report client.
//!
//! A minimal in-process server accepts one connection, parses the report
//! frame byte-for-byte, and answers with a canned acknowledgment — the
//! same exchange the estimation server performs.

use bytes::Bytes;
use herdscale_core::{CameraPosition, DeviceId};
use herdscale_network::{CaptureReport, ReportClient, ReportClientConfig, ReportClientError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const IMAGE: &[u8] = &[0xFF, 0xD8, 0x00, 0x01, 0x02, 0xFF, 0xD9];

fn sample_report() -> CaptureReport {
    CaptureReport::new(
        DeviceId::new("station-01").unwrap(),
        CameraPosition::LeftSide,
        "04A1B2C3".parse().unwrap(),
        Bytes::from_static(IMAGE),
    )
}

fn client_for(addr: SocketAddr) -> ReportClient {
    ReportClient::new(ReportClientConfig {
        server_addr: addr,
        timeout: Duration::from_millis(500),
    })
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.unwrap();
    let mut body = vec![0u8; u32::from_be_bytes(len_buf) as usize];
    stream.read_exact(&mut body).await.unwrap();
    body
}

async fn write_ack(stream: &mut TcpStream, body: &str) {
    stream
        .write_all(&(body.len() as u32).to_be_bytes())
        .await
        .unwrap();
    stream.write_all(body.as_bytes()).await.unwrap();
}

#[tokio::test]
async fn test_report_roundtrip_with_weight_estimate() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let envelope = read_frame(&mut stream).await;
        let envelope: serde_json::Value = serde_json::from_slice(&envelope).unwrap();
        assert_eq!(envelope["tag"], "04A1B2C3");
        assert_eq!(envelope["device_id"], "STATION-01");
        assert_eq!(envelope["camera_position"], "left_side");
        assert_eq!(envelope["image_len"], IMAGE.len() as u64);

        let image = read_frame(&mut stream).await;
        assert_eq!(image, IMAGE);

        write_ack(&mut stream, r#"{"accepted":true,"estimated_weight":412.5}"#).await;
    });

    let mut client = client_for(addr);
    client.connect().await.unwrap();

    let ack = client.submit(sample_report()).await.unwrap();
    assert!(ack.accepted);
    assert_eq!(ack.estimated_weight, Some(412.5));

    client.close().await;
    server.await.unwrap();
}

#[tokio::test]
async fn test_read_timeout_when_server_never_acknowledges() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        // Read the report, acknowledge nothing, hold the socket open.
        let _ = read_frame(&mut stream).await;
        let _ = read_frame(&mut stream).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = client_for(addr);
    client.connect().await.unwrap();

    let result = client.submit(sample_report()).await;
    assert!(matches!(result, Err(ReportClientError::ReadTimeout(_))));
    assert!(!client.is_connected());

    server.abort();
}

#[tokio::test]
async fn test_connection_lost_when_server_closes_early() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        // Close without reading or acknowledging.
        drop(stream);
    });

    let mut client = client_for(addr);
    client.connect().await.unwrap();
    server.await.unwrap();

    let result = client.submit(sample_report()).await;
    // Depending on when the RST lands, the send or the ack read fails;
    // either way the client must end up disconnected, never stuck.
    assert!(result.is_err());
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_reconnect_after_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_frame(&mut stream).await;
            let _ = read_frame(&mut stream).await;
            write_ack(&mut stream, r#"{"accepted":true}"#).await;
        }
    });

    let mut client = client_for(addr);

    client.connect().await.unwrap();
    assert!(client.submit(sample_report()).await.unwrap().accepted);
    client.close().await;

    client.connect().await.unwrap();
    assert!(client.submit(sample_report()).await.unwrap().accepted);
    client.close().await;

    server.await.unwrap();
}
