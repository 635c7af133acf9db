//! In-memory chat client used by the interactive harness.
//!
//! `SimulatedChat` stands in for a real UI tree: it holds a short message
//! history, a voice connection flag and a focus position. When focus is on the
//! message input it is a text-entry context, so the layer forwards keys to it
//! and [`SimulatedChat::type_key`] edits a draft.

use std::cell::{Cell, RefCell};

use crossterm::event::{KeyCode, KeyModifiers};
use tracing::debug;

use crate::commands::{ChatHost, HostAction, Message};
use crate::models::{Chord, HandlerError};

/// Major areas of the simulated window, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// The message list
    Messages,
    /// The message input box
    MessageInput,
    /// The server list
    ServerList,
    /// The user area with mute/deafen controls
    UserArea,
}

impl Area {
    const CYCLE: [Self; 4] = [
        Self::Messages,
        Self::MessageInput,
        Self::ServerList,
        Self::UserArea,
    ];

    /// Spoken name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Messages => "Messages",
            Self::MessageInput => "Message input",
            Self::ServerList => "Server list",
            Self::UserArea => "User area",
        }
    }

    fn next(self) -> Self {
        let index = Self::CYCLE.iter().position(|a| *a == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }
}

/// Simulated chat window.
#[derive(Debug)]
pub struct SimulatedChat {
    messages: RefCell<Vec<Message>>,
    unread_from: Option<usize>,
    voice: Cell<bool>,
    area: Cell<Area>,
    focused_message: Cell<Option<usize>>,
    draft: RefCell<String>,
}

impl Default for SimulatedChat {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChat {
    /// A channel with a few messages and an active voice connection.
    #[must_use]
    pub fn new() -> Self {
        let messages = vec![
            Message::new("Riley", "Morning all"),
            Message::new("Sam", "Anyone up for a voice call later?"),
            Message::new("Alex", "Sure, after lunch"),
            Message::new("Riley", "Pushed the fix for the login bug"),
            Message::new("Sam", "Nice, testing it now"),
        ];
        Self {
            messages: RefCell::new(messages),
            unread_from: Some(3),
            voice: Cell::new(true),
            area: Cell::new(Area::Messages),
            focused_message: Cell::new(None),
            draft: RefCell::new(String::new()),
        }
    }

    /// Replace the message history.
    #[must_use]
    pub fn with_messages(self, messages: Vec<Message>) -> Self {
        *self.messages.borrow_mut() = messages;
        self
    }

    /// Set the voice connection flag.
    #[must_use]
    pub fn with_voice(self, connected: bool) -> Self {
        self.voice.set(connected);
        self
    }

    /// Area that currently has focus.
    #[must_use]
    pub fn area(&self) -> Area {
        self.area.get()
    }

    /// Move focus to an area.
    pub fn focus(&self, area: Area) {
        debug!(area = area.name(), "focus moved");
        self.area.set(area);
    }

    /// True while the message input has focus.
    #[must_use]
    pub fn is_text_entry_focused(&self) -> bool {
        self.area.get() == Area::MessageInput
    }

    /// Message that received real focus, if any.
    #[must_use]
    pub fn focused_message(&self) -> Option<usize> {
        self.focused_message.get()
    }

    /// Text typed into the input and not yet sent.
    #[must_use]
    pub fn draft(&self) -> String {
        self.draft.borrow().clone()
    }

    /// Deliver a key the layer passed through.
    ///
    /// Only the message input reacts: characters extend the draft, Backspace
    /// deletes, Enter sends, Tab and Escape leave the input. Returns a line
    /// describing what happened, or `None` when the key had no effect.
    pub fn type_key(&self, chord: Chord) -> Option<String> {
        if !self.is_text_entry_focused() {
            return None;
        }
        if chord.is_tab() || chord.is_shift_tab() || chord.is_escape() {
            self.focus(Area::Messages);
            return Some(format!("focus: {}", Area::Messages.name()));
        }
        if chord.is_enter() {
            let text = std::mem::take(&mut *self.draft.borrow_mut());
            if text.trim().is_empty() {
                return None;
            }
            self.messages.borrow_mut().push(Message::new("You", text.clone()));
            return Some(format!("sent: {text}"));
        }

        match chord.code() {
            KeyCode::Backspace => {
                self.draft.borrow_mut().pop();
            }
            KeyCode::Char(c) if chord.is_bare() => self.draft.borrow_mut().push(c),
            KeyCode::Char(c) if chord.modifiers() == KeyModifiers::SHIFT => {
                self.draft.borrow_mut().push(c.to_ascii_uppercase());
            }
            _ => return None,
        }
        Some(format!("draft: {}", self.draft.borrow()))
    }
}

impl ChatHost for SimulatedChat {
    fn perform(&self, action: HostAction) -> Result<String, HandlerError> {
        let text = match action {
            HostAction::ActiveNow => "Active Now: Riley, playing Factorio".to_string(),
            HostAction::VoiceServers => {
                if self.voice.get() {
                    "Voice active in: Rustaceans".to_string()
                } else {
                    "No servers with active voice".to_string()
                }
            }
            HostAction::ListButtons => "Buttons: Mute, Deafen, User Settings".to_string(),
            HostAction::FocusMessageInput => {
                self.focus(Area::MessageInput);
                Area::MessageInput.name().to_string()
            }
            HostAction::FocusServerList => {
                self.focus(Area::ServerList);
                Area::ServerList.name().to_string()
            }
            HostAction::FocusUserArea => {
                self.focus(Area::UserArea);
                Area::UserArea.name().to_string()
            }
            HostAction::CycleAreas => {
                let next = self.area.get().next();
                self.focus(next);
                next.name().to_string()
            }
            HostAction::PinnedMessages => return Err(HandlerError::not_found("Pinned messages button")),
            HostAction::ThreadList => "Thread list opened, no threads".to_string(),
            HostAction::Disconnect => {
                self.voice.set(false);
                "Disconnected".to_string()
            }
            HostAction::Ping => "Ping 42 milliseconds".to_string(),
            HostAction::Typing => "Nobody is typing".to_string(),
            HostAction::ChannelInfo => "general, Rustaceans server".to_string(),
            HostAction::Diagnostic => format!(
                "{} messages, focus in {}",
                self.messages.borrow().len(),
                self.area.get().name()
            ),
            HostAction::MessageDebug => format!(
                "Message list found with {} messages",
                self.messages.borrow().len()
            ),
            HostAction::EventLog => "Event logging started".to_string(),
        };
        Ok(text)
    }

    fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    fn unread_marker(&self) -> Option<usize> {
        self.unread_from
            .filter(|&index| index < self.messages.borrow().len())
    }

    fn focus_message(&self, index: usize) -> Result<(), HandlerError> {
        if index >= self.messages.borrow().len() {
            return Err(HandlerError::not_found("Message"));
        }
        self.focused_message.set(Some(index));
        self.focus(Area::Messages);
        Ok(())
    }

    fn voice_connected(&self) -> bool {
        self.voice.get()
    }
}
