//! The command layer state machine.
//!
//! A single prefix key arms the layer; the next key is then read as a command
//! chord instead of being typed into the host application. From the armed
//! state Tab and Shift+Tab start exploring the registry, Enter runs the
//! explored command, and Escape or any unknown key cancels.
//!
//! # Ownership
//!
//! [`LayerMachine`] holds the immutable parts (registry, prefix chord,
//! settings) and the collaborators. The mutable session lives in
//! [`LayerState`], which the caller owns and passes to every dispatch call,
//! so resetting a session is an explicit operation on a value.
//!
//! # Timing
//!
//! Two single-shot timers exist per session: the inactivity timeout, and the
//! rapid-repeat window after a prefix press. The enter-layer tone is held back
//! until that window elapses, so a quick double press (which types the prefix
//! character) never beeps. Timers are fired from [`LayerMachine::tick`], which
//! also runs ahead of every key event using the event's timestamp.

pub mod repeat;
pub mod timer;

use std::rc::Rc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind};
use tracing::{debug, info, warn};

use crate::feedback::{Feedback, FeedbackSink};
use crate::focus::FocusContext;
use crate::models::{Chord, CommandDescriptor};
use crate::registry::{CommandRegistry, RegistryError};

pub use repeat::{RapidRepeatDetector, DEFAULT_REPEAT_WINDOW};
pub use timer::{Clock, Deadline, ManualClock, SystemClock};

/// Default inactivity timeout.
pub const DEFAULT_LAYER_TIMEOUT: Duration = Duration::from_secs(5);

/// Current layer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keys go to the host; only the prefix is watched for
    #[default]
    Idle,
    /// Prefix pressed; the next key is a command chord
    Armed,
    /// Browsing the registry with Tab / Shift+Tab
    Exploring,
}

/// What the inactivity timeout does besides returning to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutFeedback {
    /// Leave the layer without a sound
    #[default]
    Silent,
    /// Play the cancel tone
    CancelTone,
}

/// Timing and feedback settings for the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSettings {
    /// Inactivity timeout while Armed or Exploring
    pub timeout: Duration,
    /// Double-press window for the prefix key
    pub rapid_repeat_window: Duration,
    /// Behavior when the timeout fires
    pub timeout_feedback: TimeoutFeedback,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LAYER_TIMEOUT,
            rapid_repeat_window: DEFAULT_REPEAT_WINDOW,
            timeout_feedback: TimeoutFeedback::default(),
        }
    }
}

/// Configuration errors that stop the layer from starting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    /// The registry itself is inconsistent
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The prefix must be a single bare key
    #[error("prefix key {0} must not use modifiers")]
    PrefixHasModifiers(Chord),
    /// The prefix is already a command chord or a layer control key
    #[error("prefix key {chord} conflicts with {existing}")]
    PrefixConflict {
        /// The rejected prefix
        chord: Chord,
        /// What it collides with
        existing: String,
    },
    /// A command is bound to a key the layer reserves for exploration
    #[error("chord {0} is reserved for exploring commands")]
    ReservedChord(Chord),
}

/// Phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    /// Key pressed
    Down,
    /// Auto-repeat while held
    Repeat,
    /// Key released
    Up,
}

/// A resolved key event with its arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    /// Normalized chord
    pub chord: Chord,
    /// Arrival time
    pub timestamp: Instant,
    /// Press, repeat or release
    pub phase: KeyPhase,
}

impl KeyInput {
    /// A key-down event.
    #[must_use]
    pub const fn down(chord: Chord, timestamp: Instant) -> Self {
        Self {
            chord,
            timestamp,
            phase: KeyPhase::Down,
        }
    }

    /// Convert a crossterm key event.
    #[must_use]
    pub fn from_crossterm(event: KeyEvent, timestamp: Instant) -> Self {
        let phase = match event.kind {
            KeyEventKind::Press => KeyPhase::Down,
            KeyEventKind::Repeat => KeyPhase::Repeat,
            KeyEventKind::Release => KeyPhase::Up,
        };
        Self {
            chord: Chord::from_event(event),
            timestamp,
            phase,
        }
    }
}

/// What the host should do with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Forward the event to the host unmodified
    PassThrough,
    /// Swallow the event
    Consumed,
    /// Swallow the event and type this chord's character instead
    EmitLiteral(Chord),
}

/// Everything that can reach the layer, funneled through one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEvent {
    /// A keyboard event
    Key(KeyInput),
    /// Time passed; fire due timers
    Tick(Instant),
    /// The host window lost relevance
    Reset,
}

/// Per-session mutable state.
#[derive(Debug, Clone, Default)]
pub struct LayerState {
    mode: Mode,
    exploration_cursor: Option<usize>,
    armed_at: Option<Instant>,
    last_activity_at: Option<Instant>,
    last_announced: Option<usize>,
    inactivity: Deadline,
    enter_tone: Deadline,
}

impl LayerState {
    /// A fresh Idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// True while Armed or Exploring.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Registry index under the exploration cursor (Exploring only).
    #[must_use]
    pub const fn exploration_cursor(&self) -> Option<usize> {
        self.exploration_cursor
    }

    /// Registry index of the last announced command (Exploring only).
    #[must_use]
    pub const fn last_announced(&self) -> Option<usize> {
        self.last_announced
    }

    /// When the layer was last armed.
    #[must_use]
    pub const fn armed_at(&self) -> Option<Instant> {
        self.armed_at
    }

    /// Time of the last event that kept the layer alive.
    #[must_use]
    pub const fn last_activity_at(&self) -> Option<Instant> {
        self.last_activity_at
    }

    /// When the inactivity timeout will fire, if armed.
    #[must_use]
    pub const fn timeout_due_at(&self) -> Option<Instant> {
        self.inactivity.due_at()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// The chord-recognition and dispatch core.
pub struct LayerMachine {
    registry: CommandRegistry,
    prefix: Chord,
    settings: LayerSettings,
    prefix_detector: RapidRepeatDetector<Chord>,
    focus: Box<dyn FocusContext>,
    feedback: Rc<dyn FeedbackSink>,
}

impl LayerMachine {
    /// Build the layer, refusing inconsistent configurations.
    pub fn new(
        registry: CommandRegistry,
        prefix: Chord,
        settings: LayerSettings,
        focus: impl FocusContext + 'static,
        feedback: Rc<dyn FeedbackSink>,
    ) -> Result<Self, LayerError> {
        registry.validate()?;
        if let Some(reserved) = registry.iter().map(|c| c.chord).find(is_reserved) {
            return Err(LayerError::ReservedChord(reserved));
        }
        check_prefix(&registry, prefix)?;

        info!(prefix = %prefix, commands = registry.len(), "command layer ready");
        Ok(Self {
            registry,
            prefix,
            settings,
            prefix_detector: RapidRepeatDetector::new(settings.rapid_repeat_window),
            focus: Box::new(focus),
            feedback,
        })
    }

    /// The command registry.
    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The enter-layer chord.
    #[must_use]
    pub const fn prefix(&self) -> Chord {
        self.prefix
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &LayerSettings {
        &self.settings
    }

    /// Rebind the enter-layer chord.
    ///
    /// The registry is left untouched. The session returns to Idle so a
    /// half-entered layer cannot outlive its prefix.
    pub fn set_prefix(&mut self, state: &mut LayerState, prefix: Chord) -> Result<(), LayerError> {
        check_prefix(&self.registry, prefix)?;
        info!(old = %self.prefix, new = %prefix, "prefix key changed");
        self.prefix = prefix;
        self.reset(state);
        Ok(())
    }

    /// Silently return to Idle and forget any pending double press.
    pub fn reset(&mut self, state: &mut LayerState) {
        if state.is_active() {
            debug!(from = ?state.mode, "layer reset");
        }
        state.clear();
        self.prefix_detector.clear();
    }

    /// Single serialized entry point for queued events.
    pub fn dispatch(&mut self, state: &mut LayerState, event: LayerEvent) -> Option<KeyOutcome> {
        match event {
            LayerEvent::Key(input) => Some(self.handle_key(state, input)),
            LayerEvent::Tick(now) => {
                self.tick(state, now);
                None
            }
            LayerEvent::Reset => {
                self.reset(state);
                None
            }
        }
    }

    /// Drain a queue of events in arrival order.
    ///
    /// Waits at most `tick_every` for the next event; when nothing arrives the
    /// timers are checked against `clock`. Returns once every sender is gone.
    pub fn run_queue(
        &mut self,
        state: &mut LayerState,
        events: &Receiver<LayerEvent>,
        tick_every: Duration,
        clock: &dyn Clock,
        mut on_outcome: impl FnMut(&LayerState, KeyInput, KeyOutcome),
    ) {
        loop {
            match events.recv_timeout(tick_every) {
                Ok(LayerEvent::Key(input)) => {
                    let outcome = self.handle_key(state, input);
                    on_outcome(state, input, outcome);
                }
                Ok(other) => {
                    self.dispatch(state, other);
                }
                Err(RecvTimeoutError::Timeout) => self.tick(state, clock.now()),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Fire timers that are due at `now`.
    pub fn tick(&mut self, state: &mut LayerState, now: Instant) {
        if state.enter_tone.take_if_due(now) && state.is_active() {
            self.feedback.emit(Feedback::EnterLayer);
        }

        if state.inactivity.take_if_due(now) {
            debug!(from = ?state.mode, "layer timed out");
            if self.settings.timeout_feedback == TimeoutFeedback::CancelTone {
                self.feedback.emit(Feedback::Cancel);
            }
            state.clear();
        }
    }

    /// Classify and act on one key event.
    pub fn handle_key(&mut self, state: &mut LayerState, input: KeyInput) -> KeyOutcome {
        if self.focus.is_text_entry_focused() {
            return KeyOutcome::PassThrough;
        }

        self.tick(state, input.timestamp);

        if input.phase != KeyPhase::Down {
            // Releases and auto-repeats of keys the layer swallowed stay swallowed
            return if state.is_active() {
                KeyOutcome::Consumed
            } else {
                KeyOutcome::PassThrough
            };
        }

        match state.mode {
            Mode::Idle => self.handle_idle(state, input),
            Mode::Armed | Mode::Exploring => self.handle_active(state, input),
        }
    }

    fn handle_idle(&mut self, state: &mut LayerState, input: KeyInput) -> KeyOutcome {
        if input.chord != self.prefix {
            return KeyOutcome::PassThrough;
        }

        if self.prefix_detector.observe(self.prefix, input.timestamp) {
            debug!(prefix = %self.prefix, "double press, typing prefix");
            return KeyOutcome::EmitLiteral(self.prefix);
        }

        let now = input.timestamp;
        state.mode = Mode::Armed;
        state.armed_at = Some(now);
        state.last_activity_at = Some(now);
        state.inactivity.arm(now, self.settings.timeout);
        state.enter_tone.arm(now, self.settings.rapid_repeat_window);
        debug!("layer armed");
        KeyOutcome::Consumed
    }

    fn handle_active(&mut self, state: &mut LayerState, input: KeyInput) -> KeyOutcome {
        let chord = input.chord;
        let now = input.timestamp;
        state.last_activity_at = Some(now);

        if chord == self.prefix && self.prefix_detector.observe(self.prefix, now) {
            debug!(prefix = %self.prefix, "double press, typing prefix");
            state.clear();
            return KeyOutcome::EmitLiteral(self.prefix);
        }
        // Only the press right after arming can pair with the arming prefix
        self.prefix_detector.clear();

        // Whatever this key does, its own feedback replaces the pending enter tone
        state.enter_tone.cancel();

        if chord.is_escape() {
            self.cancel(state);
        } else if chord.is_tab() {
            self.explore(state, Direction::Forward, now);
        } else if chord.is_shift_tab() {
            self.explore(state, Direction::Backward, now);
        } else if chord.is_enter() && state.mode == Mode::Exploring {
            match state.last_announced {
                Some(index) => self.execute(state, index),
                None => self.cancel(state),
            }
        } else if let Some(command) = self.registry.lookup(&chord) {
            let index = command.registration_order;
            self.execute(state, index);
        } else {
            debug!(chord = %chord, "no command for chord");
            self.cancel(state);
        }
        KeyOutcome::Consumed
    }

    fn cancel(&self, state: &mut LayerState) {
        debug!(from = ?state.mode, "layer cancelled");
        state.clear();
        self.feedback.emit(Feedback::Cancel);
    }

    fn explore(&self, state: &mut LayerState, direction: Direction, now: Instant) {
        let size = self.registry.len();
        let (next, wrapped) = match (state.exploration_cursor, direction) {
            (None, Direction::Forward) => (0, false),
            (None, Direction::Backward) => (size - 1, false),
            (Some(cursor), Direction::Forward) => {
                let next = (cursor + 1) % size;
                (next, next == 0)
            }
            (Some(0), Direction::Backward) => (size - 1, true),
            (Some(cursor), Direction::Backward) => (cursor - 1, false),
        };

        state.mode = Mode::Exploring;
        state.exploration_cursor = Some(next);
        state.last_announced = Some(next);
        state.inactivity.arm(now, self.settings.timeout);

        if wrapped {
            self.feedback.emit(Feedback::WrapBoundary);
        }
        let command = self.registry.by_index(next);
        debug!(index = next, chord = %command.chord, "exploring");
        self.feedback.emit(Feedback::Announce(command.announcement()));
    }

    fn execute(&self, state: &mut LayerState, index: usize) {
        let command: &CommandDescriptor = self.registry.by_index(index);
        // Leave the layer before running the handler so a failure can never keep it armed
        state.clear();

        if !command.is_available() {
            debug!(chord = %command.chord, "command unavailable");
            self.feedback.emit(Feedback::Cancel);
            return;
        }

        debug!(chord = %command.chord, description = %command.description, "running command");
        match command.handler.execute() {
            Ok(()) => self.feedback.emit(Feedback::CommandExecuted),
            Err(err) => {
                warn!(chord = %command.chord, error = %err, "command failed");
                self.feedback.emit(Feedback::ElementNotFound(err.notification()));
            }
        }
    }
}

/// Keys the layer keeps for itself.
fn is_reserved(chord: &Chord) -> bool {
    chord.is_tab() || chord.is_shift_tab() || chord.is_escape()
}

/// Check that `prefix` can enter a layer over `registry`.
///
/// The prefix must be a bare key that is neither a layer control key nor a
/// registered command chord.
pub fn check_prefix(registry: &CommandRegistry, prefix: Chord) -> Result<(), LayerError> {
    if !prefix.is_bare() {
        return Err(LayerError::PrefixHasModifiers(prefix));
    }
    if is_reserved(&prefix) || prefix.is_enter() {
        return Err(LayerError::PrefixConflict {
            chord: prefix,
            existing: "a layer control key".to_string(),
        });
    }
    if let Some(existing) = registry.lookup(&prefix) {
        return Err(LayerError::PrefixConflict {
            chord: prefix,
            existing: format!("command \"{}\"", existing.description),
        });
    }
    Ok(())
}
