//! Capture-command camera backend.
//!
//! The reference hardware captures stills with the platform's camera
//! utility (`rpicam-still` on the Pi), reading the encoded frame from the
//! child's stdout. The command and arguments come from configuration, so
//! other backends (`libcamera-still`, a test script) drop in without code
//! changes.

use herdscale_hardware::{Camera, HardwareError, ImageData, Result};
use tokio::process::Command;
use tracing::debug;

/// A [`Camera`] that shells out to a capture command per frame.
pub struct CommandCamera {
    command: String,
    args: Vec<String>,
}

impl CommandCamera {
    /// Create a camera invoking `command` with `args` for each capture.
    pub fn new(command: impl Into<String>, args: &[String]) -> Self {
        Self {
            command: command.into(),
            args: args.to_vec(),
        }
    }
}

impl Camera for CommandCamera {
    async fn capture(&mut self) -> Result<ImageData> {
        debug!(command = %self.command, "invoking capture command");

        let output = Command::new(&self.command)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                HardwareError::capture(format!("failed to run {:?}: {e}", self.command))
            })?;

        if !output.status.success() {
            return Err(HardwareError::capture(format!(
                "{:?} exited with {}",
                self.command, output.status
            )));
        }

        if output.stdout.is_empty() {
            return Err(HardwareError::capture("capture produced no data"));
        }

        Ok(ImageData::from_vec(output.stdout))
    }
}
