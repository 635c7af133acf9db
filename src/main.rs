//! ChordLayer - modal command layer for keyboard-driven applications
//!
//! Runs the interactive harness by default, or one of the headless
//! subcommands for listing commands and managing configuration.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chordlayer::cli::{CommandsArgs, ConfigArgs, ExitCode, RunArgs};

/// ChordLayer - modal command layer with spoken feedback
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive command layer (default)
    Run(RunArgs),
    /// List layer commands in exploration order
    Commands(CommandsArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with command output
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Some(Command::Run(args)) => args.execute(),
        Some(Command::Commands(args)) => args.execute(),
        Some(Command::Config(args)) => args.execute(),
        None => RunArgs::default().execute(),
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(err.exit_code().code());
        }
    }
}
