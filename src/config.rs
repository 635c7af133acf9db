//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::layer::{check_prefix, LayerSettings, TimeoutFeedback};
use crate::models::Chord;
use crate::registry::CommandRegistry;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "CHORDLAYER_CONFIG_DIR";

/// Command layer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Prefix key that enters the layer (e.g. "[", "`", "f6")
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Inactivity timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Double-press window in milliseconds
    #[serde(default = "default_rapid_repeat_ms")]
    pub rapid_repeat_ms: u64,
    /// Play the cancel tone when the layer times out
    #[serde(default)]
    pub timeout_tone: bool,
}

fn default_prefix() -> String {
    "[".to_string()
}

const fn default_timeout_ms() -> u64 {
    5000
}

const fn default_rapid_repeat_ms() -> u64 {
    500
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            timeout_ms: default_timeout_ms(),
            rapid_repeat_ms: default_rapid_repeat_ms(),
            timeout_tone: false,
        }
    }
}

impl LayerConfig {
    /// Parse the configured prefix.
    pub fn prefix_chord(&self) -> Result<Chord> {
        Chord::parse(&self.prefix).context(format!("Invalid prefix key: '{}'", self.prefix))
    }

    /// Convert to the settings the layer runs with.
    #[must_use]
    pub fn settings(&self) -> LayerSettings {
        LayerSettings {
            timeout: Duration::from_millis(self.timeout_ms),
            rapid_repeat_window: Duration::from_millis(self.rapid_repeat_ms),
            timeout_feedback: if self.timeout_tone {
                TimeoutFeedback::CancelTone
            } else {
                TimeoutFeedback::Silent
            },
        }
    }
}

/// Feedback preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Print tones in the terminal harness
    #[serde(default = "default_tones")]
    pub tones: bool,
}

const fn default_tones() -> bool {
    true
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            tones: default_tones(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/ChordLayer/config.toml`
/// - macOS: `~/Library/Application Support/ChordLayer/config.toml`
/// - Windows: `%APPDATA%\ChordLayer\config.toml`
///
/// `CHORDLAYER_CONFIG_DIR` replaces the directory when set.
///
/// # Validation
///
/// - `prefix` must parse as a chord and use no modifiers
/// - `prefix` must not be Tab, Shift+Tab, Escape or Enter
/// - `timeout_ms` must be positive
/// - `rapid_repeat_ms` must be positive and shorter than the timeout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Command layer settings
    #[serde(default)]
    pub layer: LayerConfig,
    /// Feedback preferences
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    ///
    /// - Linux: `~/.config/ChordLayer/`
    /// - macOS: `~/Library/Application Support/ChordLayer/`
    /// - Windows: `%APPDATA%\ChordLayer\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("ChordLayer");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        Self::from_toml(&content).context(format!(
            "Failed to load config file: {}",
            config_path.display()
        ))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        // Ensure config directory exists
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        // Serialize to TOML
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        // Write to temp file
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, &config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let prefix = self.layer.prefix_chord()?;
        if !prefix.is_bare() {
            anyhow::bail!("Prefix key must be a single key without modifiers: {}", prefix);
        }
        check_prefix(&CommandRegistry::new(), prefix)?;

        if self.layer.timeout_ms == 0 {
            anyhow::bail!("Layer timeout must be greater than zero");
        }

        if self.layer.rapid_repeat_ms == 0 {
            anyhow::bail!("Rapid-repeat window must be greater than zero");
        }

        if self.layer.rapid_repeat_ms >= self.layer.timeout_ms {
            anyhow::bail!(
                "Rapid-repeat window ({} ms) must be shorter than the layer timeout ({} ms)",
                self.layer.rapid_repeat_ms,
                self.layer.timeout_ms
            );
        }

        Ok(())
    }

    /// Sets the prefix key with validation.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<()> {
        let previous = std::mem::replace(&mut self.layer.prefix, prefix.trim().to_string());
        if let Err(err) = self.validate() {
            self.layer.prefix = previous;
            return Err(err);
        }
        Ok(())
    }
}
