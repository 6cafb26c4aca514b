//! Sync command implementation.
//!
//! Connects to the Plex server, runs the reconciliation session over a
//! directory of NFO files and prints the run summary.

use crate::core::session::{AlwaysConfirm, ConfirmPrompt, SessionController, SessionOptions};
use crate::models::plan::UpdatePlan;
use crate::models::summary::{Outcome, RunSummary};
use crate::services::plex::PlexClient;
use crate::Result;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::Ordering;

/// Options carried from the command line.
#[derive(Debug, Clone)]
pub struct SyncArgs<'a> {
    pub path: &'a Path,
    pub dry_run: bool,
    pub yes: bool,
    pub no_art: bool,
    pub always_update_art: bool,
    pub json_summary: Option<&'a Path>,
}

/// Blocking stdin prompt used for interactive runs.
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, plan: &UpdatePlan) -> bool {
        println!();
        println!(
            "{} {} '{}':",
            "Proposed changes for".bold(),
            plan.item.kind,
            plan.item.title
        );
        for line in plan.render_lines() {
            println!("  {line}");
        }
        print!("{} ", "Apply? [y/N]:".bold());
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Execute the sync command, returning the summary for exit-code
/// derivation.
pub async fn sync(args: SyncArgs<'_>) -> Result<RunSummary> {
    println!("{}", "Reconciling NFO files with Plex...".bold().cyan());
    if args.dry_run {
        println!("{}", "Dry-run mode: no changes will be applied".yellow());
    }
    println!();

    let client = PlexClient::from_env()?;
    client.verify_connection().await?;

    let interactive = !args.yes && !args.dry_run;
    let confirm: Box<dyn ConfirmPrompt> = if interactive {
        Box::new(StdinConfirm)
    } else {
        Box::new(AlwaysConfirm)
    };

    let options = SessionOptions {
        dry_run: args.dry_run,
        interactive,
        upload_posters: !args.no_art,
        always_update_art: args.always_update_art,
    };
    let controller = SessionController::new(&client, confirm.as_ref(), options);

    // Operator interrupt stops between files, never mid-plan.
    let cancel = controller.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let summary = controller.run(args.path).await?;

    print_summary(&summary);

    if let Some(path) = args.json_summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)?;
        println!("Summary written to {}", path.display());
    }

    Ok(summary)
}

/// Print the colored run summary block.
fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "[Run Summary]".bold().green());
    println!("  {} {}", "Discovered:".bold(), summary.discovered);
    println!("  {} {}", "Matched:".bold(), summary.matched);
    println!("  {} {}", "Unmatched:".bold(), summary.unmatched);
    println!(
        "  {} {}",
        if summary.dry_run {
            "Would update:".bold()
        } else {
            "Updated:".bold()
        },
        summary.updated
    );
    println!("  {} {}", "Skipped:".bold(), summary.skipped);
    println!("  {} {}", "Failed:".bold(), summary.failed);

    if let Some(reason) = &summary.aborted {
        println!();
        println!("{} {}", "Session aborted:".bold().red(), reason);
    }

    let noteworthy: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| !matches!(o.outcome, Outcome::Applied | Outcome::Simulated))
        .collect();
    if !noteworthy.is_empty() {
        println!();
        for outcome in noteworthy {
            let label = match outcome.outcome {
                Outcome::Failed => "failed".red(),
                Outcome::Unmatched => "unmatched".yellow(),
                _ => "skipped".normal(),
            };
            match &outcome.detail {
                Some(detail) => println!(
                    "  - {} [{}] {}: {}",
                    outcome.path.display(),
                    outcome.stage,
                    label,
                    detail
                ),
                None => println!("  - {} [{}] {}", outcome.path.display(), outcome.stage, label),
            }
        }
    }
}
