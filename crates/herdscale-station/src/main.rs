//! Herdscale station binary.
//!
//! Wires the MFRC522 driver, the detection dispatcher, and the
//! capture-and-report pipeline together from configuration, and runs the
//! poll loop until interrupted. Startup is deliberately strict: no
//! reachable estimation server or no working reader link means the
//! station cannot do its job, so both abort loudly before the antenna is
//! ever energized.

mod camera;
mod config;
mod indicator;
mod pipeline;

use crate::camera::CommandCamera;
use crate::config::StationConfig;
use crate::indicator::GpioIndicator;
use crate::pipeline::CapturePipeline;
use anyhow::Context;
use herdscale_dispatch::Dispatcher;
use herdscale_hardware::{Signal, StatusIndicator};
use herdscale_network::{ReportClient, ReportClientConfig};
use herdscale_rfid::{Mfrc522, SpiBus, SpiBusConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var_os("HERDSCALE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("herdscale.toml"));
    let config = StationConfig::load_or_default(&config_path)?;

    info!(
        device = %config.device.id,
        camera_position = %config.device.camera_position,
        server = %config.server.address,
        "herdscale station starting"
    );

    // Data-link precondition: probe the estimation server before touching
    // the reader, so a dead uplink fails fast instead of after the
    // antenna is already radiating.
    let mut client = ReportClient::new(ReportClientConfig {
        server_addr: config.server_addr()?,
        timeout: Duration::from_millis(config.server.report_timeout_ms),
    });
    client
        .connect()
        .await
        .context("estimation server unreachable")?;

    let mut indicator =
        GpioIndicator::open(config.indicator.led_pin).context("status LED unavailable")?;

    let bus = SpiBus::open(&SpiBusConfig {
        bus: config.reader.spi_bus,
        slave_select: config.reader.slave_select,
        reset_pin: config.reader.reset_pin,
        clock_speed_hz: config.reader.clock_speed_hz,
    })
    .context("reader bus unavailable")?;
    let driver = Mfrc522::initialize(bus)
        .context("reader initialization failed")?
        .with_transceive_timeout(Duration::from_millis(config.reader.transceive_timeout_ms));

    indicator.signal(Signal::Ready).await.ok();
    info!("station ready, waiting for detections");

    let handler = CapturePipeline::new(
        CommandCamera::new(&config.camera.command, &config.camera.args),
        indicator,
        client,
        config.device_id()?,
        config.device.camera_position,
        Duration::from_millis(config.camera.capture_delay_ms),
    );

    let mut dispatcher = Dispatcher::new(driver, handler)
        .with_cooldown(Duration::from_millis(config.reader.cooldown_ms))
        .with_poll_interval(Duration::from_millis(config.reader.poll_interval_ms));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_token.cancel();
        }
    });

    dispatcher.run(shutdown).await;

    let (mut driver, _handler) = dispatcher.into_parts();
    driver.shutdown();
    info!("station stopped");

    Ok(())
}
