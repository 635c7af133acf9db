//! The host application seam.
//!
//! Command handlers never walk a UI tree themselves. They ask a [`ChatHost`]
//! to locate and act on elements, and turn its answer into speech. Each host
//! platform provides its own implementation.

use crate::models::HandlerError;

/// A chat message as the host exposes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name of the sender
    pub author: String,
    /// Message body
    pub content: String,
}

impl Message {
    /// Create a message.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    /// Text read aloud for this message.
    #[must_use]
    pub fn spoken(&self) -> String {
        if self.content.trim().is_empty() {
            format!("{}: (empty message)", self.author)
        } else {
            format!("{}: {}", self.author, self.content)
        }
    }
}

/// Host-side actions that are a single lookup plus an optional activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostAction {
    /// Read the "Active Now" section
    ActiveNow,
    /// Summarize voice activity on visible servers
    VoiceServers,
    /// List activatable buttons
    ListButtons,
    /// Focus the message input box
    FocusMessageInput,
    /// Focus the server list
    FocusServerList,
    /// Move focus to the next major area
    CycleAreas,
    /// Focus the user area
    FocusUserArea,
    /// Press the pinned messages button
    PinnedMessages,
    /// Open or close the thread list
    ThreadList,
    /// Press the voice disconnect button
    Disconnect,
    /// Report voice latency
    Ping,
    /// Report who is typing
    Typing,
    /// Report channel or DM information
    ChannelInfo,
    /// Dump the accessibility tree
    Diagnostic,
    /// Report what the message list lookup finds
    MessageDebug,
    /// Start logging accessibility events
    EventLog,
}

/// External collaborator that owns the real UI tree.
///
/// All methods are synchronous and expected to return quickly; they run
/// inside key dispatch.
pub trait ChatHost {
    /// Perform an action and return the text to announce.
    fn perform(&self, action: HostAction) -> Result<String, HandlerError>;

    /// Visible chat messages, oldest first.
    fn messages(&self) -> Vec<Message>;

    /// Index of the first unread message, if the marker is visible.
    fn unread_marker(&self) -> Option<usize>;

    /// Move real focus to a message.
    fn focus_message(&self, index: usize) -> Result<(), HandlerError>;

    /// Whether the user is connected to a voice channel.
    fn voice_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_message() {
        assert_eq!(Message::new("Alex", "hello").spoken(), "Alex: hello");
        assert_eq!(Message::new("Alex", "  ").spoken(), "Alex: (empty message)");
    }
}
