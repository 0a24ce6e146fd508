//! gpgstream - drive gpg from the command line.
//!
//! Imports keys into a configured or throwaway gpg home directory and reads
//! key ids from `--with-colons` listings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;

/// gpgstream - gpg key import and inspection
#[derive(Parser)]
#[command(name = "gpgstream")]
#[command(about = "Import keys with gpg and read their ids", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a key file, or stdin with "-"
    Import {
        /// Key file to import
        key: PathBuf,
    },

    /// Print the key id of a key file
    KeyId {
        /// Key file to inspect
        key: PathBuf,
    },

    /// Show or modify configuration
    Config {
        /// Key to get or set
        key: Option<String>,
        /// Value to set
        value: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Import { key } => {
            debug!("Importing key from {:?}", key);
            commands::import::execute(&key)
        }
        Commands::KeyId { key } => commands::key_id::execute(&key),
        Commands::Config { key, value } => commands::config::execute(key, value),
    }
}
