//! Shared test fixtures for layer and CLI tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::Command;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chordlayer::feedback::{Feedback, RecordingSink};
use chordlayer::focus::FocusFlag;
use chordlayer::layer::{KeyInput, KeyOutcome, LayerMachine, LayerSettings, LayerState, Mode};
use chordlayer::models::{Category, Chord, CommandDescriptor, HandlerError};
use chordlayer::registry::CommandRegistry;

/// Shorthand for a millisecond duration.
pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Parse a chord, panicking on bad test input.
pub fn chord(raw: &str) -> Chord {
    Chord::parse(raw).unwrap_or_else(|e| panic!("bad chord '{raw}' in test: {e}"))
}

/// Handler invocations recorded by description.
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// The three-command registry used throughout the scenarios:
/// A "Active Now", V "Voice summary", B "Button list".
pub fn abv_registry(calls: &CallLog) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for (key, description) in [('a', "Active Now"), ('v', "Voice summary"), ('b', "Button list")] {
        let log = Rc::clone(calls);
        registry
            .register(CommandDescriptor::new(
                Chord::char(key),
                description,
                Category::General,
                move || {
                    log.borrow_mut().push(description.to_string());
                    Ok(())
                },
            ))
            .expect("fixture chords are unique");
    }
    registry
}

/// Adds a command that always fails to find its element.
pub fn register_failing(registry: &mut CommandRegistry, key: char, context: &'static str) {
    registry
        .register(CommandDescriptor::new(
            Chord::char(key),
            "Always fails",
            Category::Diagnostic,
            move || Err(HandlerError::not_found(context)),
        ))
        .expect("fixture chords are unique");
}

/// A layer machine over a registry, with recording feedback and explicit
/// timestamps measured from `t0`.
pub struct Session {
    pub machine: LayerMachine,
    pub state: LayerState,
    pub sink: Rc<RecordingSink>,
    pub focus: FocusFlag,
    pub calls: CallLog,
    pub t0: Instant,
}

impl Session {
    /// Session over the A/V/B registry with default settings and `[` prefix.
    pub fn abv() -> Self {
        Self::abv_with(LayerSettings::default())
    }

    /// Session over the A/V/B registry with custom settings.
    pub fn abv_with(settings: LayerSettings) -> Self {
        let calls: CallLog = Rc::default();
        let registry = abv_registry(&calls);
        Self::over(registry, calls, settings)
    }

    /// Session over any registry.
    pub fn over(registry: CommandRegistry, calls: CallLog, settings: LayerSettings) -> Self {
        let sink = Rc::new(RecordingSink::new());
        let focus = FocusFlag::new(false);
        let machine = LayerMachine::new(
            registry,
            Chord::char('['),
            settings,
            focus.clone(),
            sink.clone(),
        )
        .expect("fixture registry is valid");
        Self {
            machine,
            state: LayerState::new(),
            sink,
            focus,
            calls,
            t0: Instant::now(),
        }
    }

    /// Instant `at_ms` after the session start.
    pub fn at(&self, at_ms: u64) -> Instant {
        self.t0 + ms(at_ms)
    }

    /// Key-down of `raw` at `at_ms`.
    pub fn press(&mut self, raw: &str, at_ms: u64) -> KeyOutcome {
        let input = KeyInput::down(chord(raw), self.at(at_ms));
        self.machine.handle_key(&mut self.state, input)
    }

    /// Fire timers at `at_ms`.
    pub fn tick(&mut self, at_ms: u64) {
        let now = self.at(at_ms);
        self.machine.tick(&mut self.state, now);
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn count(&self, feedback: &Feedback) -> usize {
        self.sink.count(feedback)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

/// Path to the chordlayer binary
pub fn chordlayer_bin() -> String {
    std::env::var("CARGO_BIN_EXE_chordlayer").unwrap_or_else(|_| "target/debug/chordlayer".to_string())
}

/// Creates a Command with an isolated config directory.
pub fn isolated_command(args: &[&str], config_dir: &PathBuf) -> Command {
    let mut cmd = Command::new(chordlayer_bin());
    cmd.env("CHORDLAYER_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}
