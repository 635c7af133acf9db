//! CLI command handlers for ChordLayer.
//!
//! `run` is the interactive harness; the other commands are headless and
//! scriptable.

pub mod commands;
pub mod common;
pub mod config;
pub mod run;

// Re-export types used by main.rs and tests
pub use commands::CommandsArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use run::RunArgs;
