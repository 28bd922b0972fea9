//! Hardware collaborator abstraction for the Herdscale station.
//!
//! This crate defines the trait seams between the detection core and the
//! peripherals it collaborates with: the tag reader, the camera, and the
//! status indicator. The traits enable substitution between mock
//! implementations (development, tests) and real hardware drivers — the
//! MFRC522 driver in `herdscale-rfid` implements [`TagReader`], the station
//! binary provides the camera and LED implementations.
//!
//! # Design
//!
//! - **Async-first**: all device operations are `async fn` in traits
//!   (Edition 2024 RPITIT, no `async_trait` macro).
//! - **Two-valued reads**: [`TagReader::attempt_read`] returns
//!   `Option<TagId>`. "No tag in field" and "tag present but unreadable"
//!   both surface as `None`; the dispatcher only needs a debounced yes/no
//!   signal, and transient read noise must not reach the operator.
//! - **Error-aware collaborators**: the camera and indicator return
//!   [`Result`] with [`HardwareError`] context; a capture failure is a
//!   skip-and-signal condition, never a crash.
//!
//! # Mock implementations
//!
//! The [`mock`] module ships controllable stand-ins for every trait so the
//! dispatch pipeline is testable without a reader chip, a camera, or GPIO.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{Camera, StatusIndicator, TagReader};
pub use types::{ImageData, Signal};
