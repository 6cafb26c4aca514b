//! NFO Sync CLI
//!
//! A command-line tool for reconciling NFO sidecar metadata with a Plex
//! media library.

use clap::Parser;
use nfo_sync::cli::{
    args::{Cli, Commands},
    commands::{inspect, sync},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run the appropriate command
    match cli.command {
        Commands::Sync {
            path,
            dry_run,
            yes,
            no_art,
            always_update_art,
            json_summary,
        } => {
            let summary = sync::sync(sync::SyncArgs {
                path: &path,
                dry_run,
                yes,
                no_art,
                always_update_art,
                json_summary: json_summary.as_deref(),
            })
            .await?;

            if summary.has_failures() {
                std::process::exit(1);
            }
        }

        Commands::Inspect { nfo } => {
            inspect::inspect(&nfo)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("nfo_sync=debug")
    } else {
        EnvFilter::new("nfo_sync=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
