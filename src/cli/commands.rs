//! List the command catalog in exploration order.

use std::rc::Rc;

use clap::Args;
use serde::Serialize;

use crate::cli::common::{CliError, CliResult};
use crate::commands::default_catalog;
use crate::config::Config;
use crate::demo::SimulatedChat;
use crate::feedback::RecordingSink;
use crate::layer::SystemClock;
use crate::models::{Category, Chord};
use crate::registry::CommandRegistry;

/// List layer commands
#[derive(Args, Debug)]
pub struct CommandsArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Only list commands in this category
    #[arg(long, value_name = "CATEGORY")]
    category: Option<String>,
}

/// JSON row for one command
#[derive(Serialize, Debug)]
struct CommandRow {
    index: usize,
    chord: Chord,
    description: String,
    category: Category,
}

#[derive(Serialize, Debug)]
struct CommandsOutput {
    prefix: String,
    commands: Vec<CommandRow>,
}

/// Build the default catalog over a simulated host, for listing and checks.
pub(crate) fn catalog(config: &Config) -> CliResult<CommandRegistry> {
    default_catalog(
        Rc::new(SimulatedChat::new()),
        Rc::new(RecordingSink::new()),
        Rc::new(SystemClock),
        config.layer.settings().rapid_repeat_window,
    )
    .map_err(|e| CliError::validation(e.to_string()))
}

impl CommandsArgs {
    /// Execute commands listing
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let registry = catalog(&config)?;

        let filter = self.category.as_deref().map(parse_category).transpose()?;
        let rows = rows(&registry, filter);

        if self.json {
            let output = CommandsOutput {
                prefix: config.layer.prefix.clone(),
                commands: rows,
            };
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| CliError::io(format!("Failed to serialize commands to JSON: {e}")))?;
            println!("{json}");
        } else {
            println!("Prefix key: {}", config.layer.prefix);
            println!();
            let mut current: Option<Category> = None;
            for row in &rows {
                if current != Some(row.category) {
                    if current.is_some() {
                        println!();
                    }
                    println!("{}:", row.category);
                    current = Some(row.category);
                }
                println!("  {:<14} {}", row.chord.to_string(), row.description);
            }
        }

        Ok(())
    }
}

fn rows(registry: &CommandRegistry, filter: Option<Category>) -> Vec<CommandRow> {
    registry
        .iter()
        .filter(|command| filter.map_or(true, |category| command.category == category))
        .map(|command| CommandRow {
            index: command.registration_order,
            chord: command.chord,
            description: command.description.clone(),
            category: command.category,
        })
        .collect()
}

fn parse_category(raw: &str) -> CliResult<Category> {
    Category::ALL
        .iter()
        .copied()
        .find(|category| category.label().eq_ignore_ascii_case(raw))
        .ok_or_else(|| {
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
            CliError::validation(format!(
                "Unknown category '{raw}'. Expected one of: {}",
                names.join(", ")
            ))
        })
}
