//! End-to-end tests of the default catalog driven through the layer.

use std::rc::Rc;
use std::time::Instant;

use chordlayer::commands::{default_catalog, ChatHost, Message};
use chordlayer::demo::{Area, SimulatedChat};
use chordlayer::feedback::{Feedback, RecordingSink};
use chordlayer::layer::{KeyInput, KeyOutcome, LayerMachine, LayerSettings, LayerState, ManualClock, Mode};
use chordlayer::models::Category;

mod fixtures;
use fixtures::{chord, ms};

struct Client {
    machine: LayerMachine,
    state: LayerState,
    chat: Rc<SimulatedChat>,
    sink: Rc<RecordingSink>,
    clock: ManualClock,
    t0: Instant,
}

impl Client {
    fn new(chat: SimulatedChat) -> Self {
        let chat = Rc::new(chat);
        let sink = Rc::new(RecordingSink::new());
        let t0 = Instant::now();
        let clock = ManualClock::starting_at(t0);
        let settings = LayerSettings::default();
        let registry = default_catalog(
            chat.clone(),
            sink.clone(),
            Rc::new(clock.clone()),
            settings.rapid_repeat_window,
        )
        .unwrap();
        let focus_chat = Rc::clone(&chat);
        let machine = LayerMachine::new(
            registry,
            chord("["),
            settings,
            move || focus_chat.is_text_entry_focused(),
            sink.clone(),
        )
        .unwrap();
        Self {
            machine,
            state: LayerState::new(),
            chat,
            sink,
            clock,
            t0,
        }
    }

    fn press(&mut self, raw: &str, at_ms: u64) -> KeyOutcome {
        let at = self.t0 + ms(at_ms);
        self.clock.set(at);
        self.machine
            .handle_key(&mut self.state, KeyInput::down(chord(raw), at))
    }

    /// Prefix then command, far enough apart to avoid the double-press window.
    fn command(&mut self, raw: &str, at_ms: u64) {
        self.press("[", at_ms);
        self.press(raw, at_ms + 600);
    }

    fn last_announcement(&self) -> Option<String> {
        self.sink.announcements().last().cloned()
    }
}

#[test]
fn test_catalog_exploration_starts_with_general() {
    let mut c = Client::new(SimulatedChat::new());
    c.press("[", 0);
    c.press("tab", 600);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("A: Announce Active Now section")
    );
    c.press("shift+tab", 700);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("0: Read 10th most recent message")
    );
    assert_eq!(c.sink.count(&Feedback::WrapBoundary), 1);
}

#[test]
fn test_catalog_has_no_reserved_chords() {
    let c = Client::new(SimulatedChat::new());
    for command in c.machine.registry().iter() {
        assert!(
            !command.chord.is_tab() && !command.chord.is_shift_tab() && !command.chord.is_escape(),
            "{} is reserved",
            command.chord
        );
    }
    assert!(c
        .machine
        .registry()
        .iter()
        .any(|command| command.category == Category::Diagnostic));
}

#[test]
fn test_read_messages_through_layer() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("h", 0);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("Message 1 of 5. Riley: Morning all")
    );
    c.command("l", 2000);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("Message 2 of 5. Sam: Anyone up for a voice call later?")
    );
    c.command("1", 4000);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("Message 5 of 5. Sam: Nice, testing it now")
    );
    assert_eq!(c.sink.count(&Feedback::CommandExecuted), 3);
    assert_eq!(c.state.mode(), Mode::Idle);
}

#[test]
fn test_boundary_read_beeps() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("h", 0);
    c.command("j", 2000);
    assert_eq!(c.sink.count(&Feedback::WrapBoundary), 1);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("Message 1 of 5. Riley: Morning all")
    );
}

#[test]
fn test_recent_beyond_history_reports() {
    let chat = SimulatedChat::new().with_messages(vec![Message::new("Sam", "only one")]);
    let mut c = Client::new(chat);
    c.command("3", 0);
    assert_eq!(
        c.sink.events().last(),
        Some(&Feedback::ElementNotFound("Only 1 messages available".to_string()))
    );
    assert_eq!(c.state.mode(), Mode::Idle);
}

#[test]
fn test_empty_history_reports_not_found() {
    let mut c = Client::new(SimulatedChat::new().with_messages(Vec::new()));
    c.command("k", 0);
    assert_eq!(
        c.sink.events().last(),
        Some(&Feedback::ElementNotFound("Messages not found".to_string()))
    );
}

#[test]
fn test_read_current_twice_across_layer_entries_spells() {
    let mut c = Client::new(SimulatedChat::new());
    // Even rhythm: the second prefix re-enters the layer instead of typing itself
    assert_eq!(c.press("[", 0), KeyOutcome::Consumed);
    assert_eq!(c.press("k", 150), KeyOutcome::Consumed);
    assert_eq!(c.press("[", 300), KeyOutcome::Consumed);
    assert_eq!(c.state.mode(), Mode::Armed);
    assert_eq!(c.press("k", 450), KeyOutcome::Consumed);

    let events = c.sink.events();
    assert!(events.contains(&Feedback::Announce(
        "Message 5 of 5. Sam: Nice, testing it now".to_string()
    )));
    assert_eq!(
        events.last(),
        Some(&Feedback::CommandExecuted),
        "spelling still counts as a successful command"
    );
    assert!(events.contains(&Feedback::Spell("Nice, testing it now".to_string())));
}

#[test]
fn test_read_current_slowly_reads_twice() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("k", 0);
    c.command("k", 2000);
    assert!(c
        .sink
        .events()
        .iter()
        .all(|f| !matches!(f, Feedback::Spell(_))));
    assert_eq!(c.sink.announcements().len(), 2);
}

#[test]
fn test_voice_commands_follow_connection() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("p", 0);
    assert_eq!(
        c.last_announcement().as_deref(),
        Some("Ping 42 milliseconds")
    );

    c.command("d", 2000);
    assert!(!c.chat.voice_connected());

    let cancels = c.sink.count(&Feedback::Cancel);
    c.command("p", 4000);
    assert_eq!(c.sink.count(&Feedback::Cancel), cancels + 1);
}

#[test]
fn test_voice_commands_unavailable_without_connection() {
    let mut c = Client::new(SimulatedChat::new().with_voice(false));
    c.command("d", 0);
    c.command("p", 2000);
    assert_eq!(c.sink.count(&Feedback::Cancel), 2);
    assert_eq!(c.sink.count(&Feedback::CommandExecuted), 0);
    assert!(c.sink.announcements().is_empty());
}

#[test]
fn test_focus_input_makes_prefix_typeable() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("e", 0);
    assert_eq!(c.chat.area(), Area::MessageInput);

    assert_eq!(c.press("[", 2000), KeyOutcome::PassThrough);
    assert_eq!(c.state.mode(), Mode::Idle);
    c.chat.type_key(chord("["));
    c.chat.type_key(chord("escape"));
    assert_eq!(c.chat.draft(), "[");

    assert_eq!(c.press("[", 3000), KeyOutcome::Consumed);
    assert_eq!(c.state.mode(), Mode::Armed);
}

#[test]
fn test_missing_element_reports_context() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("shift+p", 0);
    assert_eq!(
        c.sink.events().last(),
        Some(&Feedback::ElementNotFound(
            "Pinned messages button not found".to_string()
        ))
    );
    assert_eq!(c.state.mode(), Mode::Idle);
}

#[test]
fn test_focus_current_message() {
    let mut c = Client::new(SimulatedChat::new());
    c.command("shift+h", 0);
    assert_eq!(
        c.sink.announcements(),
        vec![
            "Message 4 of 5. Riley: Pushed the fix for the login bug".to_string(),
            "Unread messages start here.".to_string(),
        ]
    );
    c.command("shift+k", 2000);
    assert_eq!(c.chat.focused_message(), Some(3));
}
