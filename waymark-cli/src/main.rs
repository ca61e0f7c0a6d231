//! Waymark CLI - Command-line interface
//!
//! Runs the marker pipeline over recorded tracks and manages the persisted
//! markers, tracking flag and configuration.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::replay::ReplayArgs;
use error::CliError;
use runner::{CliRunner, GlobalArgs};

#[derive(Debug, Parser)]
#[command(name = "waymark", version, about = "Drop address markers along a location track")]
struct Cli {
    /// Configuration file (default: ~/.waymark/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for persisted markers and settings
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the pipeline over a recorded fix file (newline-delimited JSON)
    Replay {
        /// Recording to replay
        file: PathBuf,

        /// Skip reverse geocoding; every marker gets the fallback address
        #[arg(long)]
        offline: bool,

        /// Minimum distance between markers, in metres
        #[arg(long, value_name = "METRES")]
        min_distance: Option<f64>,

        /// Delay between replayed records, in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 0)]
        interval: u64,
    },

    /// List saved markers
    Markers,

    /// Delete all saved markers
    Clear,

    /// Enable or disable tracking
    Toggle,

    /// Show tracking status
    Status,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let globals = GlobalArgs {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    if let Commands::Config { command } = cli.command {
        return commands::config::run(command, &globals.config_path());
    }

    let runner = CliRunner::new(&globals)?;
    match cli.command {
        Commands::Replay {
            file,
            offline,
            min_distance,
            interval,
        } => commands::replay::run(
            &runner,
            ReplayArgs {
                file,
                offline,
                min_distance,
                interval_ms: interval,
            },
        ),
        Commands::Markers => commands::markers::list(&runner),
        Commands::Clear => commands::markers::clear(&runner),
        Commands::Toggle => commands::tracking::toggle(&runner),
        Commands::Status => commands::tracking::status(&runner),
        Commands::Config { .. } => Ok(()),
    }
}
