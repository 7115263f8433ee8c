//! Hypescan CLI: find the moments chat went wild.
//!
//! Usage:
//!   hypescan analyze <LOG>          Detect highlights in a chat log
//!   hypescan import <CSV>           List the highlights in a CSV file
//!   hypescan convert <IN> <OUT>     Turn a highlight table into a marker list
//!   hypescan profile <ACTION>       Manage saved detection profiles

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hypescan_common::config::AppConfig;

mod commands;

use commands::analyze::AnalyzeArgs;
use commands::profile::ProfileAction;

#[derive(Parser)]
#[command(
    name = "hypescan",
    about = "Chat-activity highlight detection for livestream VODs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect peaks and valleys of chat activity in a chat log
    Analyze(AnalyzeArgs),

    /// Read a highlight CSV and list its rows
    Import {
        /// Path to the CSV file
        path: PathBuf,
    },

    /// Convert a column-based highlight CSV into a plain-seconds marker list
    Convert {
        /// Input CSV with `hh:mm:ss` times in the fifth column
        input: PathBuf,

        /// Output marker file
        output: PathBuf,
    },

    /// Manage named detection profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::load();

    // Initialize logging
    let mut logging = app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    hypescan_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(&app, args),
        Commands::Import { path } => commands::import::run(path),
        Commands::Convert { input, output } => commands::convert::run(input, output),
        Commands::Profile { action } => commands::profile::run(app, action),
    }
}
