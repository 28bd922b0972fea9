//! Dispatcher state machine.
//!
//! Two states, one legal cycle: `Idle → Dispatching → Idle`. The machine
//! exists to make the no-queuing rule explicit — while a detection is
//! being handed off, the dispatcher must not start another read.

use std::fmt;
use thiserror::Error;

/// Logical state of the detection dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No pending action; polling may proceed.
    Idle,

    /// A detection event is being handed to the collaborators.
    Dispatching,
}

impl DispatchState {
    /// Validate and perform a transition.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidTransition`] for anything but
    /// `Idle → Dispatching` or `Dispatching → Idle`.
    pub fn transition_to(self, next: DispatchState) -> Result<DispatchState, DispatchError> {
        match (self, next) {
            (DispatchState::Idle, DispatchState::Dispatching)
            | (DispatchState::Dispatching, DispatchState::Idle) => Ok(next),
            (from, to) => Err(DispatchError::InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DispatchState::Idle => write!(f, "idle"),
            DispatchState::Dispatching => write!(f, "dispatching"),
        }
    }
}

/// Errors of the dispatch state machine.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: DispatchState,
        to: DispatchState,
    },
}
