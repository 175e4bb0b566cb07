//! RW CLI - Documentation engine.
//!
//! Provides commands for:
//! - `confluence plan`: Preview how rendered documents map onto a Confluence space

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ConfluenceCommand;
use output::{Console, Tone};

/// RW - Documentation engine.
#[derive(Parser)]
#[command(name = "rw", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Confluence publishing commands.
    #[command(subcommand)]
    Confluence(ConfluenceCommand),
}

fn main() {
    let cli = Cli::parse();
    let console = Console::new();

    let verbose = match &cli.command {
        Commands::Confluence(cmd) => cmd.verbose(),
    };

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Confluence(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        console.line(Tone::Failure, &format!("Error: {err}"));
        std::process::exit(1);
    }
}
