//! Double-press detection.
//!
//! The same detector decides "prefix typed twice means a literal prefix" and
//! "read-message pressed twice means spell it". It remembers exactly one
//! prior trigger; a detected repeat consumes that baseline so a triple press
//! reads as baseline, repeat, new baseline.

use std::time::{Duration, Instant};

/// Default double-press window.
pub const DEFAULT_REPEAT_WINDOW: Duration = Duration::from_millis(500);

/// Reports whether a trigger repeats the previous one within a time window.
#[derive(Debug, Clone)]
pub struct RapidRepeatDetector<K> {
    window: Duration,
    last: Option<(K, Instant)>,
}

impl<K: PartialEq> RapidRepeatDetector<K> {
    /// Create a detector with the given window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Observe a trigger.
    ///
    /// Returns `true` and clears the baseline when the previous unconsumed
    /// trigger had the same identity and happened less than `window` ago.
    /// Otherwise records `(identity, at)` as the new baseline and returns
    /// `false`.
    pub fn observe(&mut self, identity: K, at: Instant) -> bool {
        if let Some((last_identity, last_at)) = self.last.take() {
            if last_identity == identity && at.saturating_duration_since(last_at) < self.window {
                return true;
            }
        }
        self.last = Some((identity, at));
        false
    }

    /// Forget the recorded baseline.
    pub fn clear(&mut self) {
        self.last = None;
    }
}

impl<K: PartialEq> Default for RapidRepeatDetector<K> {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_WINDOW)
    }
}
