//! GPIO status LED.

use herdscale_hardware::{HardwareError, Result, Signal, StatusIndicator};
use rppal::gpio::{Gpio, OutputPin};
use tracing::trace;

/// Single-LED indicator on a GPIO output pin.
pub struct GpioIndicator {
    pin: OutputPin,
}

impl GpioIndicator {
    /// Claim the LED pin (BCM numbering), starting low.
    ///
    /// # Errors
    ///
    /// [`HardwareError::InitializationFailed`] when GPIO access or the pin
    /// itself is unavailable.
    pub fn open(bcm_pin: u8) -> Result<Self> {
        let gpio =
            Gpio::new().map_err(|e| HardwareError::initialization_failed(e.to_string()))?;
        let pin = gpio
            .get(bcm_pin)
            .map_err(|e| HardwareError::initialization_failed(e.to_string()))?
            .into_output_low();
        Ok(Self { pin })
    }
}

impl StatusIndicator for GpioIndicator {
    async fn signal(&mut self, signal: Signal) -> Result<()> {
        let (count, width) = signal.blink_pattern();
        trace!(?signal, count, "blinking indicator");

        for _ in 0..count {
            self.pin.set_high();
            tokio::time::sleep(width).await;
            self.pin.set_low();
            tokio::time::sleep(width).await;
        }
        Ok(())
    }
}
