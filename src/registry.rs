//! Command registry: the ordered catalog of layer commands.
//!
//! The registry is the single source of truth for which chords mean what
//! inside the command layer. Registration order doubles as exploration order,
//! so the registry keeps both a chord index and the insertion sequence.

use std::collections::HashMap;

use crate::models::{Chord, ChordParseError, CommandDescriptor};

/// Configuration errors detected while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two commands were bound to the same chord.
    #[error("chord {chord} is already bound to \"{existing}\"")]
    DuplicateChord {
        /// The contested chord
        chord: Chord,
        /// Description of the command that already owns it
        existing: String,
    },
    /// The registry holds no commands, so exploration has nothing to cycle.
    #[error("command registry is empty")]
    Empty,
    /// A chord given as text did not parse.
    #[error("invalid chord '{text}': {source}")]
    InvalidChord {
        /// The text as written
        text: String,
        /// Why it was rejected
        source: ChordParseError,
    },
}

/// Ordered, append-only catalog of command descriptors.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    /// Descriptors in registration order
    commands: Vec<CommandDescriptor>,
    /// Maps chord to index into `commands`
    by_chord: HashMap<Chord, usize>,
}

impl CommandRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, assigning its registration order.
    pub fn register(&mut self, mut descriptor: CommandDescriptor) -> Result<usize, RegistryError> {
        if let Some(&index) = self.by_chord.get(&descriptor.chord) {
            return Err(RegistryError::DuplicateChord {
                chord: descriptor.chord,
                existing: self.commands[index].description.clone(),
            });
        }

        let index = self.commands.len();
        descriptor.registration_order = index;
        self.by_chord.insert(descriptor.chord, index);
        self.commands.push(descriptor);
        Ok(index)
    }

    /// Look up the command bound to a chord.
    #[must_use]
    pub fn lookup(&self, chord: &Chord) -> Option<&CommandDescriptor> {
        self.by_chord.get(chord).map(|&index| &self.commands[index])
    }

    /// Check whether a chord is bound.
    #[must_use]
    pub fn contains(&self, chord: &Chord) -> bool {
        self.by_chord.contains_key(chord)
    }

    /// Get a command by exploration index, wrapping modulo the registry size.
    ///
    /// # Panics
    ///
    /// Panics on an empty registry; [`CommandRegistry::validate`] rejects that
    /// configuration before any layer is built over it.
    #[must_use]
    pub fn by_index(&self, index: usize) -> &CommandDescriptor {
        &self.commands[index % self.commands.len()]
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate in registration (exploration) order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    /// Reject configurations the layer cannot run with.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.commands.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(())
    }
}
