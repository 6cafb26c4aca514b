//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NFO Sync - Reconcile NFO sidecar files with a Plex library
#[derive(Parser, Debug)]
#[command(name = "nfo-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile NFO files under a directory with the library
    Sync {
        /// Directory to scan for NFO files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Compute and report plans without mutating the library
        #[arg(long)]
        dry_run: bool,

        /// Apply every plan without prompting
        #[arg(short = 'y', long)]
        yes: bool,

        /// Disable poster uploads
        #[arg(long)]
        no_art: bool,

        /// Upload posters even for items with no field changes
        #[arg(long, conflicts_with = "no_art")]
        always_update_art: bool,

        /// Write a machine-readable run summary to this path
        #[arg(long, value_name = "FILE")]
        json_summary: Option<PathBuf>,
    },

    /// Parse and classify a single NFO file without touching the library
    Inspect {
        /// NFO file to inspect
        #[arg(value_name = "NFO_FILE")]
        nfo: PathBuf,
    },
}
