//! The default command catalog for the chat client layer.
//!
//! Letters form the main set, arrow/Home/End keys alias the message reading
//! commands, Shift variants reach secondary actions, Ctrl variants are
//! diagnostics, and the digit row reads recent messages. Registration order
//! here is the order users hear while exploring with Tab.

pub mod host;
pub mod messages;

use std::rc::Rc;
use std::time::Duration;

use crate::feedback::{Feedback, FeedbackSink};
use crate::layer::Clock;
use crate::models::{Category, Chord, CommandDescriptor, HandlerError};
use crate::registry::{CommandRegistry, RegistryError};

pub use host::{ChatHost, HostAction, Message};
pub use messages::MessageNavigator;

/// Message reading commands and their descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Read {
    First,
    Previous,
    Current,
    Next,
    Last,
    UnreadMarker,
    FocusCurrent,
    Recent(usize),
}

impl Read {
    fn run(self, navigator: &MessageNavigator) -> Result<(), HandlerError> {
        match self {
            Self::First => navigator.first(),
            Self::Previous => navigator.previous(),
            Self::Current => navigator.current(),
            Self::Next => navigator.next(),
            Self::Last => navigator.last(),
            Self::UnreadMarker => navigator.unread_marker(),
            Self::FocusCurrent => navigator.focus_current(),
            Self::Recent(n) => navigator.recent(n),
        }
    }
}

/// Host actions: (chord, action, description, category)
const HOST_COMMANDS: &[(&str, HostAction, &str, Category)] = &[
    ("a", HostAction::ActiveNow, "Announce Active Now section", Category::General),
    ("v", HostAction::VoiceServers, "Report servers with active voice", Category::General),
    ("b", HostAction::ListButtons, "List buttons", Category::General),
    ("e", HostAction::FocusMessageInput, "Move focus to message input", Category::Navigation),
    ("s", HostAction::FocusServerList, "Move focus to server list", Category::Navigation),
    ("n", HostAction::CycleAreas, "Cycle focus among areas", Category::Navigation),
    ("u", HostAction::FocusUserArea, "Move focus to user area", Category::Navigation),
];

const READ_COMMANDS: &[(&str, Read, &str)] = &[
    ("h", Read::First, "First message"),
    ("j", Read::Previous, "Previous message"),
    ("k", Read::Current, "Current message (double-tap to spell)"),
    ("l", Read::Next, "Next message"),
    (";", Read::Last, "Last message"),
    ("home", Read::First, "First message"),
    ("leftarrow", Read::Previous, "Previous message"),
    ("downarrow", Read::Current, "Current message (double-tap to spell)"),
    ("rightarrow", Read::Next, "Next message"),
    ("end", Read::Last, "Last message"),
    ("shift+h", Read::UnreadMarker, "Jump to unread marker"),
    ("shift+home", Read::UnreadMarker, "Jump to unread marker"),
    ("shift+k", Read::FocusCurrent, "Focus current message"),
];

const SECONDARY_COMMANDS: &[(&str, HostAction, &str, Category)] = &[
    ("shift+p", HostAction::PinnedMessages, "Open pinned messages", Category::Messages),
    ("shift+t", HostAction::ThreadList, "Toggle thread list", Category::Messages),
    ("d", HostAction::Disconnect, "Disconnect from voice", Category::Voice),
    ("p", HostAction::Ping, "Report ping / latency", Category::Voice),
    ("t", HostAction::Typing, "Who is typing", Category::Information),
    ("w", HostAction::ChannelInfo, "Channel / DM information", Category::Information),
    ("control+e", HostAction::Diagnostic, "Dump accessibility tree", Category::Diagnostic),
    ("control+m", HostAction::MessageDebug, "Message list diagnostic", Category::Diagnostic),
    ("control+l", HostAction::EventLog, "Log accessibility events", Category::Diagnostic),
];

/// Actions that need a live voice connection.
fn needs_voice(action: HostAction) -> bool {
    matches!(action, HostAction::Disconnect | HostAction::Ping)
}

fn ordinal(n: usize) -> String {
    match n {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        _ => format!("{n}th"),
    }
}

fn table_chord(raw: &str) -> Result<Chord, RegistryError> {
    Chord::parse(raw).map_err(|source| RegistryError::InvalidChord {
        text: raw.to_string(),
        source,
    })
}

fn host_command(
    raw: &str,
    action: HostAction,
    description: &str,
    category: Category,
    host: &Rc<dyn ChatHost>,
    feedback: &Rc<dyn FeedbackSink>,
) -> Result<CommandDescriptor, RegistryError> {
    let run_host = Rc::clone(host);
    let speak = Rc::clone(feedback);
    let descriptor = CommandDescriptor::new(table_chord(raw)?, description, category, move || {
        let text = run_host.perform(action)?;
        if !text.is_empty() {
            speak.emit(Feedback::Announce(text));
        }
        Ok(())
    });

    if needs_voice(action) {
        let voice_host = Rc::clone(host);
        Ok(descriptor.available_when(move || voice_host.voice_connected()))
    } else {
        Ok(descriptor)
    }
}

fn read_command(
    raw: &str,
    read: Read,
    description: &str,
    navigator: &Rc<MessageNavigator>,
) -> Result<CommandDescriptor, RegistryError> {
    let navigator = Rc::clone(navigator);
    Ok(CommandDescriptor::new(
        table_chord(raw)?,
        description,
        Category::Messages,
        move || read.run(&navigator),
    ))
}

/// Build the default registry over a host.
///
/// `spell_window` is the double-press window for spelling the current
/// message; it normally matches the layer's rapid-repeat window.
pub fn default_catalog(
    host: Rc<dyn ChatHost>,
    feedback: Rc<dyn FeedbackSink>,
    clock: Rc<dyn Clock>,
    spell_window: Duration,
) -> Result<CommandRegistry, RegistryError> {
    let navigator = Rc::new(MessageNavigator::new(
        Rc::clone(&host),
        Rc::clone(&feedback),
        clock,
        spell_window,
    ));
    let mut registry = CommandRegistry::new();

    for &(raw, action, description, category) in HOST_COMMANDS {
        registry.register(host_command(raw, action, description, category, &host, &feedback)?)?;
    }
    for &(raw, read, description) in READ_COMMANDS {
        registry.register(read_command(raw, read, description, &navigator)?)?;
    }
    for &(raw, action, description, category) in SECONDARY_COMMANDS {
        registry.register(host_command(raw, action, description, category, &host, &feedback)?)?;
    }

    // Digit row: 1-9, then 0 for the 10th
    for n in 1..=10 {
        let key = if n == 10 { '0' } else { char::from(b'0' + n as u8) };
        let description = format!("Read {} most recent message", ordinal(n));
        registry.register(read_command(&key.to_string(), Read::Recent(n), &description, &navigator)?)?;
    }

    Ok(registry)
}
