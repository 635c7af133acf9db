//! Configuration management CLI commands.

use crate::cli::commands::catalog;
use crate::cli::common::{CliError, CliResult};
use crate::config::{Config, FeedbackConfig, LayerConfig};
use crate::constants::{APP_BINARY_NAME, APP_NAME};
use crate::layer::check_prefix;
use clap::{Args, Subcommand};
use serde::Serialize;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Prefix key that enters the command layer (e.g. "[", "`", "f6")
    #[arg(long, value_name = "KEY")]
    prefix: Option<String>,

    /// Inactivity timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Double-press window in milliseconds
    #[arg(long, value_name = "MS")]
    rapid_repeat_ms: Option<u64>,

    /// Play the cancel tone when the layer times out (true or false)
    #[arg(long, value_name = "BOOL")]
    timeout_tone: Option<bool>,

    /// Print tones in the interactive harness (true or false)
    #[arg(long, value_name = "BOOL")]
    tones: Option<bool>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    layer: &'a LayerConfig,
    feedback: &'a FeedbackConfig,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;

        if self.json {
            output_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    fn is_empty(&self) -> bool {
        self.prefix.is_none()
            && self.timeout_ms.is_none()
            && self.rapid_repeat_ms.is_none()
            && self.timeout_tone.is_none()
            && self.tones.is_none()
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.is_empty() {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --prefix, --timeout-ms, --rapid-repeat-ms, --timeout-tone, or --tones",
            ));
        }

        let mut config = load_config()?;

        if let Some(prefix) = &self.prefix {
            config
                .set_prefix(prefix)
                .map_err(|e| CliError::validation(format!("{e:#}")))?;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.layer.timeout_ms = timeout_ms;
        }
        if let Some(rapid_repeat_ms) = self.rapid_repeat_ms {
            config.layer.rapid_repeat_ms = rapid_repeat_ms;
        }
        if let Some(timeout_tone) = self.timeout_tone {
            config.layer.timeout_tone = timeout_tone;
        }
        if let Some(tones) = self.tones {
            config.feedback.tones = tones;
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        let prefix = config
            .layer
            .prefix_chord()
            .map_err(|e| CliError::validation(format!("{e:#}")))?;
        check_prefix(&catalog(&config)?, prefix)
            .map_err(|e| CliError::validation(e.to_string()))?;

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Output configuration in JSON format
fn output_json(config: &Config) -> CliResult<()> {
    let output = ConfigOutput {
        config_file: Config::config_file_path()
            .ok()
            .map(|p| p.to_string_lossy().to_string()),
        layer: &config.layer,
        feedback: &config.feedback,
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::io(format!("Failed to serialize configuration to JSON: {e}")))?;

    println!("{json}");
    Ok(())
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("{APP_NAME} Configuration");
    println!("=======================");
    println!();

    match Config::config_file_path() {
        Ok(path) if path.exists() => println!("File: {}", path.display()),
        Ok(path) => println!("File: {} (not created, using defaults)", path.display()),
        Err(_) => println!("File: (no config directory)"),
    }
    println!();

    println!("Layer:");
    println!("  Prefix Key: {}", config.layer.prefix);
    println!("  Timeout: {} ms", config.layer.timeout_ms);
    println!("  Rapid-Repeat Window: {} ms", config.layer.rapid_repeat_ms);
    println!("  Timeout Tone: {}", on_off(config.layer.timeout_tone));
    println!();

    println!("Feedback:");
    println!("  Tones: {}", on_off(config.feedback.tones));
    println!();

    println!("Change a value with: {APP_BINARY_NAME} config set --prefix <KEY>");
}

const fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
