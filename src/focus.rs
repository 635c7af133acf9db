//! Focus context oracle.
//!
//! The layer asks, once per key-down event, whether the focused control is a
//! free-text editor. When it is, the prefix key is ordinary typing and the
//! event is forwarded untouched. Implementations run on every keystroke and
//! must not block.

use std::cell::Cell;
use std::rc::Rc;

/// Answers "is the current input target a text-entry context?".
pub trait FocusContext {
    /// True when the focused control accepts free text.
    fn is_text_entry_focused(&self) -> bool;
}

impl<F> FocusContext for F
where
    F: Fn() -> bool,
{
    fn is_text_entry_focused(&self) -> bool {
        self()
    }
}

/// Shared, settable focus flag.
///
/// Hosts that learn about focus changes through their own events can flip
/// this flag; the layer reads it without any lookup.
#[derive(Debug, Clone, Default)]
pub struct FocusFlag {
    text_entry: Rc<Cell<bool>>,
}

impl FocusFlag {
    /// Create a flag with the given initial value.
    #[must_use]
    pub fn new(text_entry: bool) -> Self {
        Self {
            text_entry: Rc::new(Cell::new(text_entry)),
        }
    }

    /// Update the flag; every clone observes the change.
    pub fn set(&self, text_entry: bool) {
        self.text_entry.set(text_entry);
    }
}

impl FocusContext for FocusFlag {
    fn is_text_entry_focused(&self) -> bool {
        self.text_entry.get()
    }
}
