//! Data models for chords and commands.
//!
//! Models are independent of the layer state machine and of any host
//! application; they only describe what a command is and how it is keyed.

pub mod chord;
pub mod command;

// Re-export all model types
pub use chord::{Chord, ChordParseError};
pub use command::{Availability, Category, CommandDescriptor, CommandHandler, HandlerError};
