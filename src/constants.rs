//! Application-wide constants.

/// The display name of the application.
pub const APP_NAME: &str = "ChordLayer";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "chordlayer";

/// How often the interactive harness checks timers while no key arrives.
pub const TICK_INTERVAL_MS: u64 = 50;
