//! ChordLayer library
//!
//! A modal command layer for keyboard-driven applications: a prefix key arms
//! the layer, the next chord runs a command, and Tab explores the registry
//! with spoken feedback. The library holds the state machine, the command
//! registry and catalog, configuration, and the CLI handlers used by the
//! `chordlayer` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod demo;
pub mod feedback;
pub mod focus;
pub mod layer;
pub mod models;
pub mod registry;
