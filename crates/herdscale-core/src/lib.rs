//! Core types shared across the Herdscale weighing station.
//!
//! This crate defines the domain vocabulary every other crate speaks: tag
//! identifiers read from the RFID field, station/device identification,
//! camera placement, the shared error type, and the timing constants the
//! acquisition pipeline is calibrated with.
//!
//! Nothing in here touches hardware or performs I/O; the types are plain
//! data with validation, so they are usable from the driver, the dispatcher,
//! the network client, and tests alike.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
