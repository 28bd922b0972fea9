//! MFRC522 reader driver for the Herdscale station.
//!
//! This crate owns the serial link to the proximity reader chip and its
//! register file, and exposes one operation to the rest of the system:
//! attempt to read a tag identifier. Internally that runs the ISO 14443A
//! request + anti-collision exchange against the chip's FIFO, with every
//! wait bounded in real elapsed time.
//!
//! # Layering
//!
//! - [`registers`] — the chip's register file and command codes, with the
//!   SPI address encoding the datasheet mandates.
//! - [`bus`] — the [`RegisterBus`] primitive pair (single-register read and
//!   write) plus the rppal-backed [`SpiBus`] for real hardware. Bit
//!   set/clear helpers are read-modify-write on those two primitives; no
//!   other transaction type exists.
//! - [`driver`] — the [`Mfrc522`] state machine: reset/init sequencing,
//!   antenna control, and the two-phase tag read.
//!
//! # Failure model
//!
//! Opening the bus and stabilizing the chip after reset can fail for real
//! ([`DriverError`]); everything that can go wrong during a single read
//! attempt — timeout, framing error, checksum mismatch, even a transfer
//! fault mid-exchange — is recoverable and collapses to "no tag this
//! attempt". A card presented at a bad angle is normal traffic, not an
//! error to report.

pub mod bus;
pub mod driver;
pub mod error;
pub mod registers;

pub use bus::{RegisterBus, SpiBus, SpiBusConfig};
pub use driver::Mfrc522;
pub use error::DriverError;
