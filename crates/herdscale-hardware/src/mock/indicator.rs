//! Mock status indicator that records the signals it receives.

use crate::{Result, traits::StatusIndicator, types::Signal};
use std::sync::{Arc, Mutex};

/// Mock indicator recording every emitted signal.
///
/// Tests keep the [`MockIndicatorHandle`] and assert on the recorded
/// sequence after the code under test has run.
#[derive(Debug, Default)]
pub struct MockIndicator {
    signals: Arc<Mutex<Vec<Signal>>>,
}

impl MockIndicator {
    /// Create a mock indicator and a handle observing it.
    pub fn new() -> (Self, MockIndicatorHandle) {
        let signals = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                signals: Arc::clone(&signals),
            },
            MockIndicatorHandle { signals },
        )
    }
}

impl StatusIndicator for MockIndicator {
    async fn signal(&mut self, signal: Signal) -> Result<()> {
        self.signals
            .lock()
            .expect("indicator signal log poisoned")
            .push(signal);
        Ok(())
    }
}

/// Observer handle for a [`MockIndicator`].
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    signals: Arc<Mutex<Vec<Signal>>>,
}

impl MockIndicatorHandle {
    /// Snapshot of the signals emitted so far, in order.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.signals
            .lock()
            .expect("indicator signal log poisoned")
            .clone()
    }

    /// Number of signals emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signals
            .lock()
            .expect("indicator signal log poisoned")
            .len()
    }

    /// Whether no signal has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
