//! The poll-decide-dispatch loop.

use crate::debounce::DetectionFilter;
use crate::state::{DispatchError, DispatchState};
use herdscale_core::TagId;
use herdscale_core::constants::{DEFAULT_COOLDOWN_MS, DEFAULT_POLL_INTERVAL_MS};
use herdscale_hardware::TagReader;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Maximum number of accepted detections kept for diagnostics.
///
/// A day of normal race traffic is a few hundred events; 64 is enough to
/// reconstruct the recent past when debugging in the field without growing
/// without bound.
const MAX_HISTORY_SIZE: usize = 64;

/// The capture-and-report collaborator invoked for each accepted
/// detection.
///
/// The outcome is observed for logging and signaling only; it never feeds
/// back into debounce state. A detection whose downstream handling failed
/// still occupies the cooldown window.
pub trait DetectionHandler {
    /// Handle one accepted detection event.
    async fn on_detection(&mut self, tag: &TagId) -> HandlerOutcome;
}

/// Opaque result of handing a detection to the collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandlerOutcome {
    /// Capture and report both went through. The server may have attached
    /// a weight estimate; it is surfaced for signaling, never interpreted.
    Completed { estimated_weight: Option<f64> },

    /// The camera produced no frame; nothing was reported.
    CaptureFailed,

    /// The report could not be delivered.
    ReportFailed,
}

/// One accepted detection, as kept in the diagnostic history.
#[derive(Debug, Clone)]
pub struct DetectionRecord {
    pub tag: TagId,
    pub accepted_at: Instant,
    pub outcome: HandlerOutcome,
}

/// Polls the reader on a fixed cadence and dispatches debounced detection
/// events to the handler.
///
/// Single logical thread of control: a cycle runs to completion before the
/// next one begins, and the reader is owned exclusively, so no register
/// traffic can interleave.
pub struct Dispatcher<R, H> {
    reader: R,
    handler: H,
    filter: DetectionFilter,
    state: DispatchState,
    history: VecDeque<DetectionRecord>,
    poll_interval: Duration,
}

impl<R: TagReader, H: DetectionHandler> Dispatcher<R, H> {
    /// Create a dispatcher with the default cadence (100 ms) and cooldown
    /// (5 s).
    pub fn new(reader: R, handler: H) -> Self {
        Self {
            reader,
            handler,
            filter: DetectionFilter::new(Duration::from_millis(DEFAULT_COOLDOWN_MS)),
            state: DispatchState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Replace the cooldown window.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.filter = DetectionFilter::new(cooldown);
        self
    }

    /// Replace the polling cadence.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Current state of the dispatch machine.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Recent accepted detections, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &DetectionRecord> {
        self.history.iter()
    }

    /// Tear down the dispatcher, handing the reader and handler back for
    /// an orderly shutdown (antenna off, connections closed).
    pub fn into_parts(self) -> (R, H) {
        (self.reader, self.handler)
    }

    /// Run the poll loop until the token is cancelled.
    ///
    /// Ticks are skipped, not queued, when a dispatch overruns the
    /// cadence — there is never a backlog of stale polls to drain.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            cooldown_ms = self.filter.cooldown().as_millis() as u64,
            "dispatcher running"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("dispatcher stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.cycle(Instant::now()).await {
                        // Cannot happen while cycle() drives the machine
                        // through its one legal round trip; surfaced loudly
                        // in case a refactor breaks that.
                        error!("dispatch cycle failed: {e}");
                    }
                }
            }
        }
    }

    /// One poll cycle at the given instant.
    ///
    /// Returns the handler outcome when a detection was dispatched, `None`
    /// when the cycle ended without one (no read, or suppressed).
    ///
    /// # Errors
    ///
    /// Only [`DispatchError::InvalidTransition`], which the cycle's own
    /// sequencing makes unreachable.
    pub async fn cycle(&mut self, now: Instant) -> Result<Option<HandlerOutcome>, DispatchError> {
        let Some(tag) = self.reader.attempt_read().await else {
            return Ok(None);
        };

        if !self.filter.admit(&tag, now) {
            trace!(%tag, "read suppressed: duplicate within cooldown");
            return Ok(None);
        }

        info!(%tag, "detection accepted");
        self.state = self.state.transition_to(DispatchState::Dispatching)?;

        let outcome = self.handler.on_detection(&tag).await;
        match outcome {
            HandlerOutcome::Completed { estimated_weight } => {
                debug!(%tag, ?estimated_weight, "detection handled");
            }
            HandlerOutcome::CaptureFailed => warn!(%tag, "capture failed for detection"),
            HandlerOutcome::ReportFailed => warn!(%tag, "report failed for detection"),
        }

        self.push_history(DetectionRecord {
            tag,
            accepted_at: now,
            outcome,
        });

        self.state = self.state.transition_to(DispatchState::Idle)?;
        Ok(Some(outcome))
    }

    fn push_history(&mut self, record: DetectionRecord) {
        if self.history.len() == MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }
}
