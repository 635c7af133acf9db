//! Command descriptors and the handler capability seam.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Chord;

/// Grouping tag for commands, used when listing and exploring the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Overview commands (active now, voice summary, buttons)
    General,
    /// Focus movement between application areas
    Navigation,
    /// Chat message reading
    Messages,
    /// Voice connection commands
    Voice,
    /// Status and channel information
    Information,
    /// Accessibility-tree diagnostics
    Diagnostic,
}

impl Category {
    /// Every category, in listing order.
    pub const ALL: [Self; 6] = [
        Self::General,
        Self::Navigation,
        Self::Messages,
        Self::Voice,
        Self::Information,
        Self::Diagnostic,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Navigation => "Navigation",
            Self::Messages => "Messages",
            Self::Voice => "Voice",
            Self::Information => "Information",
            Self::Diagnostic => "Diagnostic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure reported by a command handler.
///
/// The layer only needs to tell failure apart from success; the context
/// string is what the user hears in the "not found" notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The target UI element could not be located.
    #[error("{context} not found")]
    ElementNotFound {
        /// Name of the element that was looked for
        context: String,
    },
    /// The element was found but the action on it failed.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Shorthand for [`HandlerError::ElementNotFound`].
    pub fn not_found(context: impl Into<String>) -> Self {
        Self::ElementNotFound {
            context: context.into(),
        }
    }

    /// Text used for the user-facing notification.
    #[must_use]
    pub fn notification(&self) -> String {
        self.to_string()
    }
}

/// Zero-argument action bound to a chord.
///
/// This is where the host-specific UI lookups plug in; the dispatch core never
/// sees anything beyond success or failure.
pub trait CommandHandler {
    /// Run the command.
    fn execute(&self) -> Result<(), HandlerError>;
}

impl<F> CommandHandler for F
where
    F: Fn() -> Result<(), HandlerError>,
{
    fn execute(&self) -> Result<(), HandlerError> {
        self()
    }
}

/// Predicate deciding at dispatch time whether a command may run.
pub type Availability = Box<dyn Fn() -> bool>;

/// A registered command.
pub struct CommandDescriptor {
    /// Chord that triggers the command inside the layer
    pub chord: Chord,
    /// Description announced during exploration
    pub description: String,
    /// Grouping tag
    pub category: Category,
    /// Action to run
    pub handler: Box<dyn CommandHandler>,
    /// Optional availability predicate; `None` means always available
    pub availability: Option<Availability>,
    /// Position in exploration order, assigned by the registry
    pub registration_order: usize,
}

impl CommandDescriptor {
    /// Create an always-available descriptor from a closure.
    pub fn new(
        chord: Chord,
        description: impl Into<String>,
        category: Category,
        handler: impl Fn() -> Result<(), HandlerError> + 'static,
    ) -> Self {
        Self::from_handler(chord, description, category, handler)
    }

    /// Create an always-available descriptor from any handler implementation.
    pub fn from_handler(
        chord: Chord,
        description: impl Into<String>,
        category: Category,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            chord,
            description: description.into(),
            category,
            handler: Box::new(handler),
            availability: None,
            registration_order: 0,
        }
    }

    /// Attach an availability predicate.
    pub fn available_when(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.availability = Some(Box::new(predicate));
        self
    }

    /// Evaluate the availability predicate.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.as_ref().map_or(true, |predicate| predicate())
    }

    /// Announcement text used while exploring, e.g. `A: Announce Active Now section`.
    #[must_use]
    pub fn announcement(&self) -> String {
        format!("{}: {}", self.chord, self.description)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("chord", &self.chord)
            .field("description", &self.description)
            .field("category", &self.category)
            .field("conditional", &self.availability.is_some())
            .field("registration_order", &self.registration_order)
            .finish_non_exhaustive()
    }
}
