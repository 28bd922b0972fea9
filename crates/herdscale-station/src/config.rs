//! Station configuration, loaded from a TOML file.
//!
//! Every section has working defaults mirroring the reference wiring, so
//! a missing file yields a usable development configuration; a present
//! file is validated before anything touches hardware.

use herdscale_core::constants::{MAX_REPORT_TIMEOUT_MS, MIN_REPORT_TIMEOUT_MS};
use herdscale_core::{CameraPosition, DeviceId, Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

/// Top-level station configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StationConfig {
    pub device: DeviceSection,
    pub reader: ReaderSection,
    pub camera: CameraSection,
    pub server: ServerSection,
    pub indicator: IndicatorSection,
}

/// Station identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Station identifier included in every report.
    pub id: String,

    /// Camera placement relative to the weighing race.
    pub camera_position: CameraPosition,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            id: "HERDSCALE-01".to_string(),
            camera_position: CameraPosition::Front,
        }
    }
}

/// Reader chip wiring and acquisition timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReaderSection {
    pub spi_bus: u8,
    pub slave_select: u8,
    pub reset_pin: u8,
    pub clock_speed_hz: u32,
    pub poll_interval_ms: u64,
    pub cooldown_ms: u64,
    pub transceive_timeout_ms: u64,
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            spi_bus: 0,
            slave_select: 0,
            reset_pin: 25,
            clock_speed_hz: 1_000_000,
            poll_interval_ms: herdscale_core::constants::DEFAULT_POLL_INTERVAL_MS,
            cooldown_ms: herdscale_core::constants::DEFAULT_COOLDOWN_MS,
            transceive_timeout_ms: herdscale_core::constants::DEFAULT_TRANSCEIVE_TIMEOUT_MS,
        }
    }
}

/// Capture backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraSection {
    /// Command invoked per capture; must write the encoded frame to
    /// stdout.
    pub command: String,

    pub args: Vec<String>,

    /// Settle delay between detection and capture.
    pub capture_delay_ms: u64,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            command: "rpicam-still".to_string(),
            args: vec![
                "--output".to_string(),
                "-".to_string(),
                "--timeout".to_string(),
                "1".to_string(),
                "--nopreview".to_string(),
            ],
            capture_delay_ms: herdscale_core::constants::DEFAULT_CAPTURE_DELAY_MS,
        }
    }
}

/// Estimation server endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
    pub address: String,
    pub report_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:4700".to_string(),
            report_timeout_ms: herdscale_core::constants::DEFAULT_REPORT_TIMEOUT_MS,
        }
    }
}

/// Status LED wiring.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorSection {
    pub led_pin: u8,
}

impl Default for IndicatorSection {
    fn default() -> Self {
        Self { led_pin: 4 }
    }
}

impl StationConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// `Error::Io` when the file cannot be read, `Error::Config` on parse
    /// or validation failures.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validated station identifier.
    pub fn device_id(&self) -> Result<DeviceId> {
        DeviceId::new(&self.device.id)
    }

    /// Parsed estimation server address.
    pub fn server_addr(&self) -> Result<SocketAddr> {
        self.server
            .address
            .parse()
            .map_err(|_| Error::Config(format!("invalid server address {:?}", self.server.address)))
    }

    fn validate(&self) -> Result<()> {
        self.device_id()?;
        self.server_addr()?;

        let timeout = self.server.report_timeout_ms;
        if !(MIN_REPORT_TIMEOUT_MS..=MAX_REPORT_TIMEOUT_MS).contains(&timeout) {
            return Err(Error::Config(format!(
                "report_timeout_ms must be {MIN_REPORT_TIMEOUT_MS}-{MAX_REPORT_TIMEOUT_MS}, got {timeout}"
            )));
        }

        if self.reader.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero".into()));
        }
        if self.reader.transceive_timeout_ms == 0 {
            return Err(Error::Config(
                "transceive_timeout_ms must be non-zero".into(),
            ));
        }
        if self.camera.command.is_empty() {
            return Err(Error::MissingConfig("camera.command".into()));
        }

        Ok(())
    }
}
