//! Chat message navigation commands.
//!
//! The navigator keeps a cursor into the host's message list between layer
//! activations. Reading the current message twice in quick succession spells
//! it instead; that double press is tracked here, per message, and is not tied
//! to the layer being armed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::feedback::{Feedback, FeedbackSink};
use crate::layer::{Clock, RapidRepeatDetector};
use crate::models::HandlerError;

use super::host::{ChatHost, Message};

/// Cursor-based reader over the host's messages.
pub struct MessageNavigator {
    host: Rc<dyn ChatHost>,
    feedback: Rc<dyn FeedbackSink>,
    clock: Rc<dyn Clock>,
    cursor: Cell<Option<usize>>,
    spell: RefCell<RapidRepeatDetector<usize>>,
}

impl MessageNavigator {
    /// Create a navigator; `spell_window` is the read-twice-to-spell window.
    pub fn new(
        host: Rc<dyn ChatHost>,
        feedback: Rc<dyn FeedbackSink>,
        clock: Rc<dyn Clock>,
        spell_window: Duration,
    ) -> Self {
        Self {
            host,
            feedback,
            clock,
            cursor: Cell::new(None),
            spell: RefCell::new(RapidRepeatDetector::new(spell_window)),
        }
    }

    /// Index of the message last read, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor.get()
    }

    fn fetch(&self) -> Result<Vec<Message>, HandlerError> {
        let messages = self.host.messages();
        if messages.is_empty() {
            return Err(HandlerError::not_found("Messages"));
        }
        Ok(messages)
    }

    fn speak(&self, index: usize, messages: &[Message]) {
        let index = index.min(messages.len() - 1);
        self.cursor.set(Some(index));
        self.feedback.emit(Feedback::Announce(format!(
            "Message {} of {}. {}",
            index + 1,
            messages.len(),
            messages[index].spoken()
        )));
    }

    /// Jump to the first message.
    pub fn first(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        self.speak(0, &messages);
        Ok(())
    }

    /// Jump to the last message.
    pub fn last(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        self.speak(messages.len() - 1, &messages);
        Ok(())
    }

    /// Move to the previous message; at the top, beep and re-read it.
    pub fn previous(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        match self.cursor.get() {
            Some(cursor) if cursor > 0 => self.speak(cursor - 1, &messages),
            _ => {
                self.feedback.emit(Feedback::WrapBoundary);
                self.speak(0, &messages);
            }
        }
        Ok(())
    }

    /// Move to the next message; at the bottom, beep and re-read it.
    pub fn next(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        let last = messages.len() - 1;
        match self.cursor.get() {
            None => self.speak(0, &messages),
            Some(cursor) if cursor < last => self.speak(cursor + 1, &messages),
            Some(_) => {
                self.feedback.emit(Feedback::WrapBoundary);
                self.speak(last, &messages);
            }
        }
        Ok(())
    }

    /// Read the current message, or spell it when read twice in a row.
    ///
    /// With no cursor yet the newest message is the current one.
    pub fn current(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        let target = self
            .cursor
            .get()
            .map_or(messages.len() - 1, |cursor| cursor.min(messages.len() - 1));

        let repeated = self.spell.borrow_mut().observe(target, self.clock.now());
        if repeated {
            self.cursor.set(Some(target));
            self.feedback.emit(Feedback::Spell(messages[target].content.clone()));
        } else {
            self.speak(target, &messages);
        }
        Ok(())
    }

    /// Read the n-th most recent message (1 = newest).
    pub fn recent(&self, n: usize) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        let Some(index) = messages.len().checked_sub(n) else {
            return Err(HandlerError::Failed(format!(
                "Only {} messages available",
                messages.len()
            )));
        };
        self.speak(index, &messages);
        Ok(())
    }

    /// Jump to the unread marker.
    pub fn unread_marker(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        let index = self
            .host
            .unread_marker()
            .ok_or_else(|| HandlerError::not_found("Unread marker"))?;
        self.speak(index, &messages);
        self.feedback
            .emit(Feedback::Announce("Unread messages start here.".to_string()));
        Ok(())
    }

    /// Move real focus to the current message.
    pub fn focus_current(&self) -> Result<(), HandlerError> {
        let messages = self.fetch()?;
        let cursor = self
            .cursor
            .get()
            .ok_or_else(|| HandlerError::not_found("Current message"))?;
        let index = cursor.min(messages.len() - 1);
        self.host.focus_message(index)?;
        self.feedback.emit(Feedback::Announce(format!(
            "Focused message {} of {}",
            index + 1,
            messages.len()
        )));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::HostAction;
    use crate::feedback::RecordingSink;
    use crate::layer::ManualClock;

    struct Fixed {
        messages: Vec<Message>,
        unread: Option<usize>,
    }

    impl ChatHost for Fixed {
        fn perform(&self, _action: HostAction) -> Result<String, HandlerError> {
            Ok(String::new())
        }
        fn messages(&self) -> Vec<Message> {
            self.messages.clone()
        }
        fn unread_marker(&self) -> Option<usize> {
            self.unread
        }
        fn focus_message(&self, _index: usize) -> Result<(), HandlerError> {
            Ok(())
        }
        fn voice_connected(&self) -> bool {
            false
        }
    }

    fn navigator(count: usize) -> (MessageNavigator, Rc<RecordingSink>, ManualClock) {
        let messages = (1..=count)
            .map(|i| Message::new("Alex", format!("m{i}")))
            .collect();
        let sink = Rc::new(RecordingSink::new());
        let clock = ManualClock::default();
        let nav = MessageNavigator::new(
            Rc::new(Fixed {
                messages,
                unread: Some(1),
            }),
            sink.clone(),
            Rc::new(clock.clone()),
            Duration::from_millis(500),
        );
        (nav, sink, clock)
    }

    #[test]
    fn test_first_last() {
        let (nav, sink, _) = navigator(3);
        nav.last().unwrap();
        nav.first().unwrap();
        assert_eq!(
            sink.announcements(),
            vec![
                "Message 3 of 3. Alex: m3".to_string(),
                "Message 1 of 3. Alex: m1".to_string()
            ]
        );
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn test_previous_at_top_beeps() {
        let (nav, sink, _) = navigator(2);
        nav.previous().unwrap();
        assert_eq!(sink.count(&Feedback::WrapBoundary), 1);
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn test_next_walks_then_beeps() {
        let (nav, sink, _) = navigator(2);
        nav.next().unwrap();
        nav.next().unwrap();
        assert_eq!(sink.count(&Feedback::WrapBoundary), 0);
        nav.next().unwrap();
        assert_eq!(sink.count(&Feedback::WrapBoundary), 1);
        assert_eq!(nav.cursor(), Some(1));
    }

    #[test]
    fn test_current_twice_spells() {
        let (nav, sink, clock) = navigator(3);
        nav.current().unwrap();
        clock.advance(Duration::from_millis(200));
        nav.current().unwrap();
        clock.advance(Duration::from_millis(100));
        nav.current().unwrap();

        let events = sink.events();
        assert_eq!(events[0], Feedback::Announce("Message 3 of 3. Alex: m3".to_string()));
        assert_eq!(events[1], Feedback::Spell("m3".to_string()));
        assert_eq!(events[2], Feedback::Announce("Message 3 of 3. Alex: m3".to_string()));
    }

    #[test]
    fn test_current_slow_repeat_reads_again() {
        let (nav, sink, clock) = navigator(1);
        nav.current().unwrap();
        clock.advance(Duration::from_millis(700));
        nav.current().unwrap();
        assert_eq!(sink.announcements().len(), 2);
    }

    #[test]
    fn test_current_on_different_message_reads() {
        let (nav, sink, clock) = navigator(3);
        nav.current().unwrap();
        nav.previous().unwrap();
        clock.advance(Duration::from_millis(100));
        nav.current().unwrap();
        assert!(sink.events().iter().all(|f| !matches!(f, Feedback::Spell(_))));
    }

    #[test]
    fn test_recent() {
        let (nav, sink, _) = navigator(3);
        nav.recent(1).unwrap();
        nav.recent(3).unwrap();
        assert_eq!(
            sink.announcements(),
            vec![
                "Message 3 of 3. Alex: m3".to_string(),
                "Message 1 of 3. Alex: m1".to_string()
            ]
        );
        assert_eq!(
            nav.recent(4),
            Err(HandlerError::Failed("Only 3 messages available".to_string()))
        );
    }

    #[test]
    fn test_empty_list_not_found() {
        let (nav, _, _) = navigator(0);
        assert_eq!(nav.first(), Err(HandlerError::not_found("Messages")));
        assert_eq!(nav.current(), Err(HandlerError::not_found("Messages")));
    }

    #[test]
    fn test_unread_and_focus() {
        let (nav, sink, _) = navigator(3);
        assert_eq!(nav.focus_current(), Err(HandlerError::not_found("Current message")));
        nav.unread_marker().unwrap();
        assert_eq!(nav.cursor(), Some(1));
        nav.focus_current().unwrap();
        assert_eq!(
            sink.announcements().last().map(String::as_str),
            Some("Focused message 2 of 3")
        );
    }
}
