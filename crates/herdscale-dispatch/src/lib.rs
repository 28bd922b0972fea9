//! Detection dispatcher for the Herdscale station.
//!
//! Sits between the tag reader and the capture-and-report collaborators:
//! polls the reader on a fixed cadence, debounces the raw stream of
//! identifiers, and emits at most one detection event per qualifying read.
//!
//! # Per-cycle contract
//!
//! 1. Attempt a read; a `None` ends the cycle.
//! 2. A read identifier is accepted as a new detection event iff it
//!    differs from the last accepted identifier *or* the cooldown window
//!    has elapsed since that acceptance. Anything else is suppressed.
//! 3. On acceptance the dispatcher records the new `(tag, time)` state,
//!    enters `Dispatching`, and hands the identifier to the
//!    [`DetectionHandler`]. The handler's outcome is observed for logging
//!    and signaling only — a failed capture or report still counts as the
//!    accepted detection for cooldown purposes.
//! 4. The dispatcher returns to `Idle` when the handler completes. There
//!    is no queuing; cycles are strictly synchronous.
//!
//! The tie-break rule lets a different animal be processed immediately
//! after another while still suppressing re-reads of the animal standing
//! on the platform — one report per visit without presence tracking.

pub mod debounce;
pub mod dispatcher;
pub mod state;

pub use debounce::DetectionFilter;
pub use dispatcher::{DetectionHandler, DetectionRecord, Dispatcher, HandlerOutcome};
pub use state::{DispatchError, DispatchState};
