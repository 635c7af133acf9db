//! Cancellable single-shot timers and the clock they are read against.
//!
//! Timers never call back on their own. The dispatch loop asks the layer to
//! fire whatever is due, either ahead of a key event (using the event's
//! timestamp) or on an idle tick, so timer expiry and key events share one
//! serialized path.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests and replays.
///
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Start at the given instant.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: Instant) {
        self.now.set(to);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A single-shot deadline. Arming replaces any previous deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    /// An unarmed deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// Arm to fire `after` the given instant.
    pub fn arm(&mut self, from: Instant, after: Duration) {
        self.due = Some(from + after);
    }

    /// Disarm.
    pub fn cancel(&mut self) {
        self.due = None;
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// The pending instant, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<Instant> {
        self.due
    }

    /// True when armed and `now` has reached the deadline.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.due.is_some_and(|due| now >= due)
    }

    /// Disarm and report `true` if the deadline had been reached.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.due = None;
            true
        } else {
            false
        }
    }
}
