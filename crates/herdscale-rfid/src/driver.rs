//! The MFRC522 driver state machine.
//!
//! One public read operation, two protocol phases. The request phase
//! probes the field with the short-frame idle request and expects the
//! 2-byte ATQA; the anti-collision phase issues the cascade-level-1
//! select and expects 4 UID bytes plus the XOR checksum. Both phases run
//! inside a transceive exchange that is re-armed from scratch on every
//! call — no partial protocol state survives across attempts.

use crate::bus::RegisterBus;
use crate::error::DriverError;
use crate::registers::{Command, FIFO_CAPACITY, Register, defaults, masks, picc};
use herdscale_core::TagId;
use herdscale_core::constants::{DEFAULT_TRANSCEIVE_TIMEOUT_MS, REQUEST_RESPONSE_LENGTH};
use herdscale_hardware::TagReader;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// How many times the post-reset power-down bit is polled before the chip
/// is declared unresponsive. Bounded by construction; an unbounded retry
/// here would hang startup on a dead chip.
const RESET_POLL_LIMIT: u32 = 20;

/// Pause between post-reset polls.
const RESET_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Driver for the MFRC522 proximity reader chip.
///
/// Owns the register bus exclusively for the process lifetime; the antenna
/// is energized by [`initialize`](Mfrc522::initialize) and stays on until
/// [`shutdown`](Mfrc522::shutdown). All per-attempt protocol failures are
/// collapsed to `None` by [`attempt_read`](Mfrc522::attempt_read); only
/// bus bring-up and reset stabilization can fail fatally.
#[derive(Debug)]
pub struct Mfrc522<B: RegisterBus> {
    bus: B,
    antenna_enabled: bool,
    transceive_timeout: Duration,
}

impl<B: RegisterBus> Mfrc522<B> {
    /// Take ownership of the bus and bring the chip to its operating
    /// state: soft reset, bounded stabilization wait, timer and modulation
    /// defaults, antenna on.
    ///
    /// # Errors
    ///
    /// [`DriverError::InitTimeout`] when the post-reset power-down bit
    /// never clears within the bounded retry budget; any bus-level
    /// [`DriverError`] is passed through. Both mean the link to the chip
    /// is broken and the station cannot function.
    ///
    /// # Side effects
    ///
    /// The antenna is energized on success — an externally observable RF
    /// state change.
    pub fn initialize(bus: B) -> Result<Self, DriverError> {
        let mut driver = Self {
            bus,
            antenna_enabled: false,
            transceive_timeout: Duration::from_millis(DEFAULT_TRANSCEIVE_TIMEOUT_MS),
        };

        driver.soft_reset()?;
        driver.configure_defaults()?;
        driver.antenna_on()?;
        info!("reader initialized, antenna energized");

        Ok(driver)
    }

    /// Replace the elapsed-time bound on a single transceive wait.
    ///
    /// The default (25 ms) comfortably covers the chip's own ~15 ms
    /// countdown; shrink it only in tests.
    #[must_use]
    pub fn with_transceive_timeout(mut self, timeout: Duration) -> Self {
        self.transceive_timeout = timeout;
        self
    }

    /// Run one self-contained read attempt.
    ///
    /// Returns the tag identifier when both protocol phases succeed,
    /// `None` for "no tag present" *and* for every recoverable failure:
    /// wait deadline, chip-side timer expiry, chip-reported transmission
    /// error, unexpected response length, checksum mismatch, or a bus
    /// transfer fault mid-exchange. Callers get a debounced yes/no signal
    /// and must tolerate that collapse.
    ///
    /// Never blocks longer than two transceive timeouts.
    pub fn attempt_read(&mut self) -> Option<TagId> {
        match self.read_tag() {
            Ok(tag) => tag,
            Err(e) => {
                // A transfer fault on one attempt is recoverable; the next
                // poll retries from a clean transceive.
                trace!("read attempt abandoned on bus fault: {e}");
                None
            }
        }
    }

    /// Disable the antenna and park the chip. Idempotent; the bus itself
    /// is released when the driver is dropped.
    pub fn shutdown(&mut self) {
        if !self.antenna_enabled {
            return;
        }
        match self.bus.clear_bits(Register::TxControl, masks::ANTENNA_ENABLE) {
            Ok(()) => info!("antenna disabled"),
            Err(e) => warn!("antenna disable failed during shutdown: {e}"),
        }
        self.antenna_enabled = false;
    }

    /// Read the chip's version register (diagnostic).
    ///
    /// # Errors
    ///
    /// Passes through bus-level transfer failures.
    pub fn version(&mut self) -> Result<u8, DriverError> {
        self.bus.read_register(Register::Version)
    }

    fn soft_reset(&mut self) -> Result<(), DriverError> {
        self.bus
            .write_register(Register::Command, Command::SoftReset as u8)?;

        // The power-down bit stays high until the internal boot finishes.
        for _ in 0..RESET_POLL_LIMIT {
            if self.bus.read_register(Register::Command)? & masks::POWER_DOWN == 0 {
                return Ok(());
            }
            thread::sleep(RESET_POLL_INTERVAL);
        }

        Err(DriverError::InitTimeout)
    }

    /// Program the documented operating defaults: ~2 kHz timer with a
    /// 15 ms reload, forced 100% ASK modulation, ISO 14443-3 CRC preset.
    fn configure_defaults(&mut self) -> Result<(), DriverError> {
        self.bus.write_register(Register::TMode, defaults::TMODE)?;
        self.bus
            .write_register(Register::TPrescaler, defaults::TPRESCALER)?;
        self.bus
            .write_register(Register::TReloadLow, defaults::TRELOAD_LOW)?;
        self.bus
            .write_register(Register::TReloadHigh, defaults::TRELOAD_HIGH)?;
        self.bus.write_register(Register::TxAsk, defaults::TX_ASK)?;
        self.bus.write_register(Register::Mode, defaults::MODE)?;
        Ok(())
    }

    fn antenna_on(&mut self) -> Result<(), DriverError> {
        let value = self.bus.read_register(Register::TxControl)?;
        if value & masks::ANTENNA_ENABLE == 0 {
            self.bus.set_bits(Register::TxControl, masks::ANTENNA_ENABLE)?;
        }
        self.antenna_enabled = true;
        Ok(())
    }

    /// Both protocol phases. `Ok(None)` is a recoverable miss; `Err` is a
    /// bus fault the caller collapses to the same outcome.
    fn read_tag(&mut self) -> Result<Option<TagId>, DriverError> {
        if self.request()?.is_none() {
            return Ok(None);
        }
        self.anticollision()
    }

    /// Request phase: short-frame probe, expects the 2-byte ATQA.
    fn request(&mut self) -> Result<Option<[u8; 2]>, DriverError> {
        // 7 valid bits in the final byte — the REQA short-frame format.
        self.bus
            .write_register(Register::BitFraming, masks::SHORT_FRAME)?;

        let Some(response) = self.transceive(&[picc::REQUEST_IDLE])? else {
            return Ok(None);
        };

        if response.len() != REQUEST_RESPONSE_LENGTH {
            debug!(
                length = response.len(),
                "request answered with unexpected frame length"
            );
            return Ok(None);
        }

        Ok(Some([response[0], response[1]]))
    }

    /// Anti-collision phase: full-byte cascade-level-1 select, expects
    /// 4 UID bytes plus the XOR checksum.
    fn anticollision(&mut self) -> Result<Option<TagId>, DriverError> {
        self.bus
            .write_register(Register::BitFraming, masks::FULL_BYTE_FRAME)?;

        let Some(response) = self.transceive(&picc::ANTICOLLISION)? else {
            return Ok(None);
        };

        match TagId::from_frame(&response) {
            Ok(tag) => {
                debug!(%tag, "anti-collision resolved a tag");
                Ok(Some(tag))
            }
            Err(e) => {
                debug!("anti-collision response rejected: {e}");
                Ok(None)
            }
        }
    }

    /// One transceive exchange: arm interrupts, flush the FIFO, return to
    /// idle, stage the frame, fire, and wait — bounded in elapsed time —
    /// for receive-complete.
    fn transceive(&mut self, frame: &[u8]) -> Result<Option<Vec<u8>>, DriverError> {
        debug_assert!(frame.len() <= FIFO_CAPACITY);

        self.bus.write_register(
            Register::ComIEn,
            masks::TRANSCEIVE_IRQ_SOURCES | masks::IRQ_INVERT,
        )?;
        self.bus.clear_bits(Register::ComIrq, masks::IRQ_CLEAR)?;
        self.bus.set_bits(Register::FifoLevel, masks::FIFO_FLUSH)?;
        // Idle cancels anything outstanding; every attempt starts clean.
        self.bus
            .write_register(Register::Command, Command::Idle as u8)?;

        for &byte in frame {
            self.bus.write_register(Register::FifoData, byte)?;
        }

        self.bus
            .write_register(Register::Command, Command::Transceive as u8)?;
        self.bus.set_bits(Register::BitFraming, masks::START_SEND)?;

        // The chip raises RxIRq/IdleIRq on completion or TimerIRq when its
        // own countdown expires. The wall-clock deadline on top keeps the
        // wait bounded even if the chip never signals at all.
        let deadline = Instant::now() + self.transceive_timeout;
        let completed = loop {
            let irq = self.bus.read_register(Register::ComIrq)?;
            if irq & masks::RECEIVE_COMPLETE_IRQ != 0 {
                break true;
            }
            if irq & masks::TIMER_IRQ != 0 {
                trace!("chip timer expired before receive completed");
                break false;
            }
            if Instant::now() >= deadline {
                trace!("transceive deadline elapsed");
                break false;
            }
        };

        self.bus.clear_bits(Register::BitFraming, masks::START_SEND)?;

        if !completed {
            return Ok(None);
        }

        let error = self.bus.read_register(Register::Error)? & masks::TRANSCEIVE_ERRORS;
        if error != 0 {
            debug!(
                flags = format_args!("{error:#04x}"),
                "chip reported transmission error"
            );
            return Ok(None);
        }

        let level = (self.bus.read_register(Register::FifoLevel)? as usize).min(FIFO_CAPACITY);
        let mut response = Vec::with_capacity(level);
        for _ in 0..level {
            response.push(self.bus.read_register(Register::FifoData)?);
        }

        Ok(Some(response))
    }

    #[cfg(test)]
    fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: RegisterBus> TagReader for Mfrc522<B> {
    async fn attempt_read(&mut self) -> Option<TagId> {
        // Synchronous underneath; bounded by the transceive deadline, so a
        // poll holds the task for at most two phases' worth of waiting.
        Mfrc522::attempt_read(self)
    }
}
