//! Chord value type: a base key plus a modifier set.
//!
//! Chords are the natural key of command lookup, so two chords that a user
//! would consider the same keystroke must compare equal. Construction goes
//! through [`Chord::new`], which normalizes the different ways a terminal or
//! keyboard hook can report the same physical chord.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a chord string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChordParseError {
    /// The input was empty or only whitespace.
    #[error("chord is empty")]
    Empty,
    /// A modifier name was not recognized.
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    /// The key name was not recognized.
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

/// A key chord (key + modifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    code: KeyCode,
    modifiers: KeyModifiers,
}

/// Modifier bits that take part in chord identity.
const SIGNIFICANT_MODIFIERS: KeyModifiers = KeyModifiers::SHIFT
    .union(KeyModifiers::CONTROL)
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER);

impl Chord {
    /// Create a normalized chord.
    ///
    /// - Upper-case letters become lower-case letters with SHIFT.
    /// - `BackTab` becomes `Tab` with SHIFT.
    /// - Non-letter characters drop SHIFT, since the shift state is already
    ///   encoded in the character itself (`{` vs `[`).
    /// - Only SHIFT, CONTROL, ALT and SUPER are kept.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let mut modifiers = modifiers & SIGNIFICANT_MODIFIERS;
        let code = match code {
            KeyCode::BackTab => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::Tab
            }
            KeyCode::Char(c) if c.is_alphabetic() && c.is_uppercase() => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::Char(c.to_lowercase().next().unwrap_or(c))
            }
            KeyCode::Char(c) if !c.is_alphabetic() => {
                modifiers.remove(KeyModifiers::SHIFT);
                KeyCode::Char(c)
            }
            other => other,
        };
        Self { code, modifiers }
    }

    /// Create a chord with no modifiers.
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a chord for a plain character key.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Create a chord from a crossterm key event.
    #[must_use]
    pub fn from_event(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }

    /// The base key.
    #[must_use]
    pub const fn code(&self) -> KeyCode {
        self.code
    }

    /// The normalized modifier set.
    #[must_use]
    pub const fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    /// True when no modifier takes part in the chord.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// True for Tab without modifiers.
    #[must_use]
    pub fn is_tab(&self) -> bool {
        self.code == KeyCode::Tab && self.modifiers.is_empty()
    }

    /// True for Shift+Tab.
    #[must_use]
    pub fn is_shift_tab(&self) -> bool {
        self.code == KeyCode::Tab && self.modifiers == KeyModifiers::SHIFT
    }

    /// True for Escape without modifiers.
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Esc && self.modifiers.is_empty()
    }

    /// True for Enter without modifiers.
    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.code == KeyCode::Enter && self.modifiers.is_empty()
    }

    /// Parse a `+`-joined chord such as `shift+h`, `control+e`, `[` or `home`.
    pub fn parse(input: &str) -> Result<Self, ChordParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ChordParseError::Empty);
        }
        // A lone "+" (or a trailing "++") names the plus key itself
        if input == "+" {
            return Ok(Self::char('+'));
        }

        let (mods_part, key_part) = match input.strip_suffix("++") {
            Some(rest) => (Some(rest), "+"),
            None => match input.rsplit_once('+') {
                Some((mods, key)) => (Some(mods), key),
                None => (None, input),
            },
        };

        let mut modifiers = KeyModifiers::NONE;
        if let Some(mods) = mods_part {
            for name in mods.split('+') {
                modifiers |= parse_modifier(name)?;
            }
        }

        let code = parse_key(key_part)?;
        Ok(Self::new(code, modifiers))
    }
}

fn parse_modifier(name: &str) -> Result<KeyModifiers, ChordParseError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "shift" => Ok(KeyModifiers::SHIFT),
        "control" | "ctrl" => Ok(KeyModifiers::CONTROL),
        "alt" => Ok(KeyModifiers::ALT),
        "super" | "windows" | "cmd" => Ok(KeyModifiers::SUPER),
        other => Err(ChordParseError::UnknownModifier(other.to_string())),
    }
}

fn parse_key(name: &str) -> Result<KeyCode, ChordParseError> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = trimmed.to_ascii_lowercase();
    let code = match lower.as_str() {
        "" => return Err(ChordParseError::Empty),
        "escape" | "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "leftarrow" | "left" => KeyCode::Left,
        "rightarrow" | "right" => KeyCode::Right,
        "uparrow" | "up" => KeyCode::Up,
        "downarrow" | "down" => KeyCode::Down,
        "plus" => KeyCode::Char('+'),
        "semicolon" => KeyCode::Char(';'),
        "leftbracket" => KeyCode::Char('['),
        "rightbracket" => KeyCode::Char(']'),
        f if f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n) if (1..=24).contains(&n) => KeyCode::F(n),
            _ => return Err(ChordParseError::UnknownKey(trimmed.to_string())),
        },
        _ => return Err(ChordParseError::UnknownKey(trimmed.to_string())),
    };
    Ok(code)
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SUPER) {
            f.write_str("Super+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyCode::Esc => f.write_str("Escape"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Delete => f.write_str("Delete"),
            KeyCode::Insert => f.write_str("Insert"),
            KeyCode::Home => f.write_str("Home"),
            KeyCode::End => f.write_str("End"),
            KeyCode::PageUp => f.write_str("Page Up"),
            KeyCode::PageDown => f.write_str("Page Down"),
            KeyCode::Left => f.write_str("Left Arrow"),
            KeyCode::Right => f.write_str("Right Arrow"),
            KeyCode::Up => f.write_str("Up Arrow"),
            KeyCode::Down => f.write_str("Down Arrow"),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl Serialize for Chord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
