//! Debounce/cooldown filter over the raw identifier stream.

use herdscale_core::TagId;
use std::time::{Duration, Instant};

/// Decides which raw reads constitute a new detection event.
///
/// Owns the last accepted identifier, the instant it was accepted, and a
/// fixed cooldown. A read is admitted iff the identifier differs from the
/// last accepted one *or* more than the cooldown has elapsed since that
/// acceptance; state is updated only on admission. The filter starts with
/// no prior detection and is never persisted across restarts.
#[derive(Debug)]
pub struct DetectionFilter {
    last: Option<(TagId, Instant)>,
    cooldown: Duration,
}

impl DetectionFilter {
    /// Create a filter with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last: None,
            cooldown,
        }
    }

    /// The configured cooldown window.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// The last accepted identifier and when it was accepted.
    #[must_use]
    pub fn last_accepted(&self) -> Option<(TagId, Instant)> {
        self.last
    }

    /// Admit or suppress a read observed at `now`.
    ///
    /// Records `(tag, now)` as the new last-accepted state when admitting;
    /// suppression leaves the state untouched, so a stream of duplicate
    /// reads keeps being measured against the original acceptance time.
    pub fn admit(&mut self, tag: &TagId, now: Instant) -> bool {
        let accept = match &self.last {
            None => true,
            Some((last_tag, last_at)) => {
                tag != last_tag || now.duration_since(*last_at) > self.cooldown
            }
        };

        if accept {
            self.last = Some((*tag, now));
        }
        accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(5);

    fn tag(s: &str) -> TagId {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_read_always_admitted() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        assert!(filter.admit(&tag("04A1B2C3"), Instant::now()));
    }

    #[test]
    fn test_same_tag_within_cooldown_suppressed() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(filter.admit(&tag("04A1B2C3"), t0));
        assert!(!filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(1)));
        assert!(!filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(2)));
    }

    #[test]
    fn test_suppression_measures_from_original_acceptance() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(filter.admit(&tag("04A1B2C3"), t0));
        // Keep re-reading every 2 seconds: suppressed while inside the
        // window of the *first* acceptance, admitted once it has passed.
        assert!(!filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(2)));
        assert!(!filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(4)));
        assert!(filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_distinct_tag_admitted_immediately() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(filter.admit(&tag("04A1B2C3"), t0));
        assert!(filter.admit(&tag("0499AABB"), t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_alternating_tags_all_admitted() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(filter.admit(&tag("04A1B2C3"), t0));
        assert!(filter.admit(&tag("0499AABB"), t0 + Duration::from_millis(100)));
        // The first animal again: it differs from the last accepted tag,
        // so the cooldown does not apply.
        assert!(filter.admit(&tag("04A1B2C3"), t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_cooldown_expiry_admits_same_tag() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(filter.admit(&tag("04A1B2C3"), t0));
        assert!(filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_elapsed_exactly_cooldown_still_suppressed() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(filter.admit(&tag("04A1B2C3"), t0));
        // The window is strict: a new event needs *more* than the cooldown.
        assert!(!filter.admit(&tag("04A1B2C3"), t0 + COOLDOWN));
    }

    #[test]
    fn test_state_updates_only_on_admission() {
        let mut filter = DetectionFilter::new(COOLDOWN);
        let t0 = Instant::now();

        filter.admit(&tag("04A1B2C3"), t0);
        let (_, accepted_at) = filter.last_accepted().unwrap();

        filter.admit(&tag("04A1B2C3"), t0 + Duration::from_secs(1));
        let (_, still_at) = filter.last_accepted().unwrap();
        assert_eq!(accepted_at, still_at);
    }
}
