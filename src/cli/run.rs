//! Interactive terminal harness.
//!
//! Puts the terminal in raw mode and feeds every key through the command layer
//! over a [`SimulatedChat`]. A reader thread turns crossterm events into
//! [`LayerEvent`]s; the main thread drains the queue, so dispatch stays
//! serialized. Ctrl+C ends the session.

use std::io::{self, Write};
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, info};

use crate::cli::common::{CliError, CliResult};
use crate::commands::default_catalog;
use crate::config::Config;
use crate::constants::{APP_NAME, TICK_INTERVAL_MS};
use crate::demo::SimulatedChat;
use crate::feedback::{ConsoleSink, FeedbackSink};
use crate::layer::{KeyInput, KeyOutcome, KeyPhase, LayerEvent, LayerMachine, LayerState, Mode, SystemClock};
use crate::models::Chord;

/// Run the interactive command layer
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the configured prefix key for this session
    #[arg(long, value_name = "KEY")]
    prefix: Option<String>,

    /// Do not print tones
    #[arg(long)]
    quiet: bool,
}

impl RunArgs {
    /// Execute the interactive session
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let prefix = match &self.prefix {
            Some(raw) => Chord::parse(raw)
                .map_err(|e| CliError::validation(format!("Invalid prefix key '{raw}': {e}")))?,
            None => config
                .layer
                .prefix_chord()
                .map_err(|e| CliError::validation(format!("{e:#}")))?,
        };
        let settings = config.layer.settings();

        let chat = Rc::new(SimulatedChat::new());
        let feedback: Rc<dyn FeedbackSink> =
            Rc::new(ConsoleSink::new(config.feedback.tones && !self.quiet));
        let registry = default_catalog(
            chat.clone(),
            Rc::clone(&feedback),
            Rc::new(SystemClock),
            settings.rapid_repeat_window,
        )
        .map_err(|e| CliError::validation(e.to_string()))?;

        let focus_chat = Rc::clone(&chat);
        let mut machine = LayerMachine::new(
            registry,
            prefix,
            settings,
            move || focus_chat.is_text_entry_focused(),
            feedback,
        )
        .map_err(|e| CliError::validation(e.to_string()))?;

        println!("{APP_NAME} v{}", env!("CARGO_PKG_VERSION"));
        println!("Press {prefix} then a command key. {prefix} then Tab explores, Enter runs.");
        println!("Press {prefix} twice quickly to type it. Ctrl+C quits.");
        println!();

        setup_terminal()?;
        let session = run_session(&mut machine, &chat);
        session.and(restore_terminal())
    }
}

/// Raw mode plus focus reporting, so losing the window resets the layer.
fn setup_terminal() -> CliResult<()> {
    enable_raw_mode().map_err(|e| CliError::io(format!("Failed to enable raw mode: {e}")))?;
    if let Err(e) = execute!(io::stdout(), EnableFocusChange) {
        let _ = disable_raw_mode();
        return Err(CliError::io(format!("Failed to enable focus reporting: {e}")));
    }
    Ok(())
}

fn restore_terminal() -> CliResult<()> {
    let focus = execute!(io::stdout(), DisableFocusChange)
        .map_err(|e| CliError::io(format!("Failed to disable focus reporting: {e}")));
    let raw =
        disable_raw_mode().map_err(|e| CliError::io(format!("Failed to disable raw mode: {e}")));
    focus.and(raw)
}

/// Drive the layer until the reader thread hangs up.
fn run_session(machine: &mut LayerMachine, chat: &SimulatedChat) -> CliResult<()> {
    let (tx, rx) = mpsc::channel();
    let reader = thread::spawn(move || read_events(&tx));

    let mut state = LayerState::new();
    let mut last_mode = Mode::Idle;
    machine.run_queue(
        &mut state,
        &rx,
        Duration::from_millis(TICK_INTERVAL_MS),
        &SystemClock,
        |state, input, outcome| {
            if input.phase == KeyPhase::Down {
                report(chat, input.chord, outcome);
            }
            if state.mode() != last_mode {
                line(format!("  ({:?})", state.mode()));
                last_mode = state.mode();
            }
        },
    );
    info!("session ended");

    reader
        .join()
        .map_err(|_| CliError::io("Input thread panicked"))?
        .map_err(|e| CliError::io(format!("Failed to read terminal input: {e}")))
}

/// Forward terminal events until Ctrl+C or a closed queue.
fn read_events(tx: &Sender<LayerEvent>) -> io::Result<()> {
    loop {
        let event = match event::read()? {
            Event::Key(key) if is_interrupt(&key) => return Ok(()),
            other => match layer_event(other, Instant::now()) {
                Some(event) => event,
                None => continue,
            },
        };
        if tx.send(event).is_err() {
            return Ok(());
        }
    }
}

/// Map a terminal event onto the layer queue; `None` for events it ignores.
fn layer_event(event: Event, now: Instant) -> Option<LayerEvent> {
    match event {
        Event::Key(key) => Some(LayerEvent::Key(KeyInput::from_crossterm(key, now))),
        Event::FocusLost => Some(LayerEvent::Reset),
        _ => None,
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c' | 'C'))
}

fn report(chat: &SimulatedChat, chord: Chord, outcome: KeyOutcome) {
    match outcome {
        KeyOutcome::Consumed => debug!(chord = %chord, "consumed"),
        KeyOutcome::PassThrough => match chat.type_key(chord) {
            Some(effect) => line(format!("  {effect}")),
            None => line(format!("  {chord} -> application")),
        },
        KeyOutcome::EmitLiteral(literal) => match chat.type_key(literal) {
            Some(effect) => line(format!("  {effect}")),
            None => line(format!("  typed {literal}")),
        },
    }
}

/// Print one line; raw mode needs the explicit carriage return.
fn line(text: String) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}\r\n");
    let _ = out.flush();
}
