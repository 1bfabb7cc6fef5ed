//! # tgaudit-cli
//!
//! Command-line interface for tgaudit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tgaudit_core::Config;

mod commands;

/// tgaudit - session audit and migration toolkit
#[derive(Parser)]
#[command(name = "tgaudit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover session/metadata pairs and report malformed records
    Scan {
        /// Base directory to scan (defaults to the configured one)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Migrate file-backed sessions to the portable string form
    Convert {
        /// Base directory to scan (defaults to the configured one)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Proxy specification stamped into every converted record
        #[arg(short, long, value_name = "SPEC")]
        proxy: Option<String>,
        /// Leave metadata files untouched, report updates only
        #[arg(long)]
        no_write: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    match cli.command {
        Commands::Scan { dir } => {
            commands::scan::run(&config, dir)?;
        }
        Commands::Convert {
            dir,
            proxy,
            no_write,
        } => {
            commands::convert::run(&config, dir, proxy, no_write)?;
        }
        Commands::Config { action } => {
            commands::config::handle(action)?;
        }
    }

    Ok(())
}
