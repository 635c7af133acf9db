//! Feedback requests emitted by the layer and by command handlers.
//!
//! Everything the user perceives goes through a [`FeedbackSink`]: tones for
//! layer transitions, spoken announcements while exploring, and the
//! "not found" notification when a handler fails. Requests are fire-and-forget
//! and a sink must never feed keystrokes back into the layer.

use std::cell::RefCell;
use std::io::Write;

/// A short beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    /// Pitch in hertz
    pub frequency_hz: u32,
    /// Length in milliseconds
    pub duration_ms: u32,
}

impl Tone {
    /// Layer entered
    pub const ENTER: Self = Self::new(800, 25);
    /// Layer exited or command executed
    pub const EXIT: Self = Self::new(400, 25);
    /// Exploration wrapped around
    pub const WRAP: Self = Self::new(200, 40);
    /// Unknown key or error
    pub const ERROR: Self = Self::new(150, 60);

    const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

/// Closed set of feedback requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The command layer was entered
    EnterLayer,
    /// The layer was left without running a command
    Cancel,
    /// A command ran successfully
    CommandExecuted,
    /// Exploration crossed the end (or start) of the command list
    WrapBoundary,
    /// A command could not find its target; carries the spoken context
    ElementNotFound(String),
    /// Speak a message
    Announce(String),
    /// Speak a message character by character
    Spell(String),
}

impl Feedback {
    /// The tone played for this request, if any.
    #[must_use]
    pub const fn tone(&self) -> Option<Tone> {
        match self {
            Self::EnterLayer => Some(Tone::ENTER),
            Self::Cancel | Self::CommandExecuted => Some(Tone::EXIT),
            Self::WrapBoundary => Some(Tone::WRAP),
            Self::ElementNotFound(_) => Some(Tone::ERROR),
            Self::Announce(_) | Self::Spell(_) => None,
        }
    }

    /// The text spoken for this request, if any.
    #[must_use]
    pub fn speech(&self) -> Option<String> {
        match self {
            Self::ElementNotFound(context) | Self::Announce(context) => Some(context.clone()),
            Self::Spell(text) => Some(spell_out(text)),
            _ => None,
        }
    }
}

/// Render text the way a speech synthesizer spells it: one symbol at a time.
#[must_use]
pub fn spell_out(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Receiver for feedback requests.
///
/// Takes `&self` so the layer and the command handlers can share one sink.
pub trait FeedbackSink {
    /// Deliver a request.
    fn emit(&self, feedback: Feedback);
}

/// Sink that records every request, for inspection and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<Feedback>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Feedback> {
        self.events.borrow().clone()
    }

    /// Drain the recorded requests.
    pub fn take(&self) -> Vec<Feedback> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Count recorded requests equal to `feedback`.
    #[must_use]
    pub fn count(&self, feedback: &Feedback) -> usize {
        self.events.borrow().iter().filter(|f| *f == feedback).count()
    }

    /// All announcement texts, in order.
    #[must_use]
    pub fn announcements(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|f| match f {
                Feedback::Announce(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl FeedbackSink for RecordingSink {
    fn emit(&self, feedback: Feedback) {
        self.events.borrow_mut().push(feedback);
    }
}

/// Sink that writes tones and speech as lines on a terminal.
///
/// Lines end in `\r\n` so output stays aligned while the terminal is in raw
/// mode.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    tones: bool,
}

impl ConsoleSink {
    /// Create a console sink; `tones` controls whether beeps are printed.
    #[must_use]
    pub const fn new(tones: bool) -> Self {
        Self { tones }
    }
}

impl FeedbackSink for ConsoleSink {
    fn emit(&self, feedback: Feedback) {
        let mut out = std::io::stdout().lock();
        if self.tones {
            if let Some(tone) = feedback.tone() {
                // Terminal output is best effort; nothing to recover here
                let _ = write!(out, "  [beep {}Hz {}ms]\r\n", tone.frequency_hz, tone.duration_ms);
            }
        }
        if let Some(text) = feedback.speech() {
            let _ = write!(out, "  \u{1F50A} {text}\r\n");
        }
        let _ = out.flush();
    }
}
