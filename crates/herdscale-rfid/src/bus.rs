//! Register bus primitives and the rppal-backed SPI implementation.
//!
//! The chip speaks an SPI-framed register protocol (MSB first): a write is
//! one 2-byte transaction (address byte, value byte), a read is one
//! transaction clocking the address out and one byte back. Bit set/clear
//! helpers are read-modify-write built from those two primitives — there
//! is deliberately no third transaction type.

use crate::error::DriverError;
use crate::registers::Register;
use rppal::{
    gpio::{Gpio, OutputPin},
    spi::{Bus, Mode, SlaveSelect, Spi},
};
use std::thread;
use std::time::Duration;
use tracing::trace;

/// How long the reset line is held low, and how long the chip is given to
/// boot after release.
const RESET_PULSE: Duration = Duration::from_millis(50);

/// Single-register transaction primitives against the reader chip.
///
/// Implemented by [`SpiBus`] for real hardware and by scripted fakes in
/// tests. Exclusive ownership is the concurrency story: the driver owns
/// the bus, so no second call site can interleave transactions.
pub trait RegisterBus {
    /// Write one value to one register.
    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), DriverError>;

    /// Read one value from one register.
    fn read_register(&mut self, reg: Register) -> Result<u8, DriverError>;

    /// Set the masked bits of a register (read-modify-write).
    fn set_bits(&mut self, reg: Register, mask: u8) -> Result<(), DriverError> {
        let value = self.read_register(reg)?;
        self.write_register(reg, value | mask)
    }

    /// Clear the masked bits of a register (read-modify-write).
    fn clear_bits(&mut self, reg: Register, mask: u8) -> Result<(), DriverError> {
        let value = self.read_register(reg)?;
        self.write_register(reg, value & !mask)
    }
}

/// Configuration of the physical reader wiring.
#[derive(Debug, Clone)]
pub struct SpiBusConfig {
    /// SPI bus index (0 = `/dev/spidev0.*`).
    pub bus: u8,

    /// Chip-select line on that bus.
    pub slave_select: u8,

    /// BCM number of the GPIO wired to the chip's reset pin.
    pub reset_pin: u8,

    /// SPI clock speed in Hz. The chip tops out at 10 MHz; 1 MHz is the
    /// conservative field default.
    pub clock_speed_hz: u32,
}

impl Default for SpiBusConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            slave_select: 0,
            reset_pin: 25,
            clock_speed_hz: 1_000_000,
        }
    }
}

/// rppal-backed register bus: hardware SPI plus the reset GPIO line.
///
/// Owns both handles for the process lifetime; dropping the bus releases
/// them. Created once at startup via [`SpiBus::open`], which also runs the
/// hardware reset pulse so the chip boots from a known state before the
/// first register transaction.
pub struct SpiBus {
    spi: Spi,
    // held so the line stays claimed (and high) while the bus lives
    _reset: OutputPin,
}

impl SpiBus {
    /// Claim the reset line, pulse it, and open the SPI bus.
    ///
    /// # Errors
    ///
    /// [`DriverError::GpioUnavailable`] / [`DriverError::BusUnavailable`]
    /// when the underlying devices cannot be opened — fatal, since no tag
    /// read is possible without the link.
    pub fn open(config: &SpiBusConfig) -> Result<Self, DriverError> {
        let gpio = Gpio::new()?;
        let mut reset = gpio.get(config.reset_pin)?.into_output();

        // Hardware reset: hold low, release, give the chip time to boot.
        reset.set_low();
        thread::sleep(RESET_PULSE);
        reset.set_high();
        thread::sleep(RESET_PULSE);

        let spi = Spi::new(
            spi_bus(config.bus)?,
            slave_select(config.slave_select)?,
            config.clock_speed_hz,
            Mode::Mode0,
        )?;

        Ok(Self { spi, _reset: reset })
    }
}

impl RegisterBus for SpiBus {
    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), DriverError> {
        trace!(register = ?reg, value = format_args!("{value:#04x}"), "register write");
        let frame = [reg.write_address(), value];
        self.spi
            .write(&frame)
            .map_err(|e| DriverError::Transfer(e.to_string()))?;
        Ok(())
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, DriverError> {
        // Full-duplex: the response byte is clocked back while the padding
        // zero goes out, so it lands in the second position.
        let write_buffer = [reg.read_address(), 0];
        let mut read_buffer = [0u8; 2];
        self.spi
            .transfer(&mut read_buffer, &write_buffer)
            .map_err(|e| DriverError::Transfer(e.to_string()))?;
        trace!(register = ?reg, value = format_args!("{:#04x}", read_buffer[1]), "register read");
        Ok(read_buffer[1])
    }
}

fn spi_bus(index: u8) -> Result<Bus, DriverError> {
    match index {
        0 => Ok(Bus::Spi0),
        1 => Ok(Bus::Spi1),
        2 => Ok(Bus::Spi2),
        other => Err(DriverError::InvalidBusConfig(format!(
            "SPI bus {other} does not exist"
        ))),
    }
}

fn slave_select(index: u8) -> Result<SlaveSelect, DriverError> {
    match index {
        0 => Ok(SlaveSelect::Ss0),
        1 => Ok(SlaveSelect::Ss1),
        2 => Ok(SlaveSelect::Ss2),
        other => Err(DriverError::InvalidBusConfig(format!(
            "slave select {other} does not exist"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_bus_selector_rejected() {
        assert!(matches!(
            spi_bus(7),
            Err(DriverError::InvalidBusConfig(_))
        ));
        assert!(matches!(
            slave_select(9),
            Err(DriverError::InvalidBusConfig(_))
        ));
    }

    #[test]
    fn test_default_wiring() {
        let config = SpiBusConfig::default();
        assert_eq!(config.bus, 0);
        assert_eq!(config.clock_speed_hz, 1_000_000);
    }
}
