//! Session controller.
//!
//! Orchestrates the pipeline per discovered NFO file:
//! `Discovered -> Parsed -> Classified -> Matched -> Planned ->
//! {Confirmed | Skipped} -> {Applied | Simulated | Failed}`.
//!
//! Per-file failures are logged into the run summary and the session
//! moves on; only session-fatal errors (authorization rejected, service
//! unreachable) abort remaining processing, preserving the partial
//! summary. Files are carried through one at a time; cancellation is
//! honored between files, never mid-plan.

use crate::core::executor::{self, ExecutionResult, Executor, ExecutorConfig, PosterOutcome};
use crate::core::matcher::{MatchOutcome, Matcher};
use crate::core::{classifier, parser, planner, scanner};
use crate::models::plan::UpdatePlan;
use crate::models::record::MediaAsset;
use crate::models::summary::{Outcome, RunSummary, Stage};
use crate::services::library::LibraryService;
use crate::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Interactive confirmation seam.
///
/// Substitutable with [`AlwaysConfirm`] for non-interactive runs and for
/// tests.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, plan: &UpdatePlan) -> bool;
}

/// Approves every plan; used for `--yes` runs and automation.
pub struct AlwaysConfirm;

impl ConfirmPrompt for AlwaysConfirm {
    fn confirm(&self, _plan: &UpdatePlan) -> bool {
        true
    }
}

/// Session options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub dry_run: bool,
    /// Ask the confirm prompt before applying each plan.
    pub interactive: bool,
    pub upload_posters: bool,
    /// Refresh artwork even when no field diverges.
    pub always_update_art: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            interactive: false,
            upload_posters: true,
            always_update_art: false,
        }
    }
}

/// Session controller.
pub struct SessionController<'a> {
    service: &'a dyn LibraryService,
    confirm: &'a dyn ConfirmPrompt,
    options: SessionOptions,
    cancel: Arc<AtomicBool>,
}

impl<'a> SessionController<'a> {
    pub fn new(
        service: &'a dyn LibraryService,
        confirm: &'a dyn ConfirmPrompt,
        options: SessionOptions,
    ) -> Self {
        Self {
            service,
            confirm,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag the session cancel hook; checked between files only.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Process every NFO under `root` and aggregate the run summary.
    pub async fn run(&self, root: &Path) -> Result<RunSummary> {
        let files = scanner::discover_nfos(root)?;
        let mut summary = RunSummary::new(self.options.dry_run);
        summary.discovered = files.len();

        for path in files {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!("Cancellation requested, stopping before {}", path.display());
                summary.aborted = Some("cancelled by operator".to_string());
                break;
            }

            tracing::info!("Processing {}", path.display());
            match self.process_file(&path, &mut summary).await {
                Ok((outcome, stage, detail)) => {
                    if let Some(d) = &detail {
                        tracing::debug!("{}: {} at {} ({})", path.display(), fmt_outcome(outcome), stage, d);
                    }
                    summary.record(path, outcome, stage, detail);
                }
                Err(e) => {
                    // Session-fatal: stop here, keep what we have.
                    tracing::error!("Aborting session: {e}");
                    summary.record(path, Outcome::Failed, Stage::Executed, Some(e.to_string()));
                    summary.aborted = Some(e.to_string());
                    break;
                }
            }
        }

        Ok(summary)
    }

    /// Carry one file through the pipeline.
    ///
    /// Returns the terminal outcome; `Err` is reserved for session-fatal
    /// errors.
    async fn process_file(
        &self,
        path: &Path,
        summary: &mut RunSummary,
    ) -> Result<(Outcome, Stage, Option<String>)> {
        // Parsed
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => return Ok((Outcome::Skipped, Stage::Discovered, Some(e.to_string()))),
        };
        let doc = match parser::parse(&bytes) {
            Ok(d) => d,
            Err(e) => return Ok((Outcome::Skipped, Stage::Parsed, Some(e.to_string()))),
        };

        // Classified
        let classified = match classifier::classify(&doc, path) {
            Ok(c) => c,
            Err(e) => return Ok((Outcome::Skipped, Stage::Classified, Some(e.to_string()))),
        };

        // Matched
        let matcher = Matcher::new(self.service);
        let resolve = executor::with_retry(|| {
            matcher.resolve(&classified.record, classified.context.as_ref())
        })
        .await;
        let mut item = match resolve {
            Ok(MatchOutcome::Found(item)) => item,
            Ok(MatchOutcome::NotFound(partial)) => {
                return Ok((Outcome::Unmatched, Stage::Matched, Some(partial.to_string())))
            }
            Ok(MatchOutcome::Ambiguous { title, candidates }) => {
                let e = crate::Error::AmbiguousMatch { title, candidates };
                return Ok((Outcome::Unmatched, Stage::Matched, Some(e.to_string())));
            }
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                let e = executor::demote_transient(e);
                return Ok((Outcome::Failed, Stage::Matched, Some(e.to_string())));
            }
        };
        summary.record_matched();

        // Refresh fields so the diff runs against current remote state.
        match executor::with_retry(|| self.service.current_fields(&item)).await {
            Ok(fields) => item.fields = fields,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                let e = executor::demote_transient(e);
                return Ok((Outcome::Failed, Stage::Matched, Some(e.to_string())));
            }
        }

        // Planned
        let poster = scanner::sibling_image(path).map(MediaAsset::new);
        let plan = planner::plan(
            &classified.record,
            &item,
            poster,
            self.options.always_update_art,
        );
        if plan.is_empty() {
            return Ok((
                Outcome::Skipped,
                Stage::Planned,
                Some("already synchronized".to_string()),
            ));
        }

        // Confirmed | Skipped
        if self.options.interactive && !self.confirm.confirm(&plan) {
            return Ok((
                Outcome::Skipped,
                Stage::Confirmed,
                Some("declined by operator".to_string()),
            ));
        }

        // Applied | Simulated | Failed
        let executor = Executor::new(
            self.service,
            ExecutorConfig {
                dry_run: self.options.dry_run,
                upload_posters: self.options.upload_posters,
            },
        );
        match executor.execute(plan).await {
            Ok(ExecutionResult::Simulated { rendered }) => Ok((
                Outcome::Simulated,
                Stage::Executed,
                Some(format!("{} change(s) would apply", rendered.len())),
            )),
            Ok(ExecutionResult::Applied {
                fields_applied,
                poster: PosterOutcome::Failed(reason),
            }) => Ok((
                Outcome::Failed,
                Stage::Executed,
                Some(format!(
                    "{fields_applied} field(s) applied but poster upload failed: {reason}"
                )),
            )),
            Ok(ExecutionResult::Applied { fields_applied, .. }) => Ok((
                Outcome::Applied,
                Stage::Executed,
                Some(format!("{fields_applied} field(s) applied")),
            )),
            // The controller never hands an empty plan to the executor.
            Ok(ExecutionResult::NoOp) => Ok((
                Outcome::Skipped,
                Stage::Planned,
                Some("already synchronized".to_string()),
            )),
            Err(e) if e.is_session_fatal() => Err(e),
            Err(e) => {
                let e = executor::demote_transient(e);
                Ok((Outcome::Failed, Stage::Executed, Some(e.to_string())))
            }
        }
    }
}

fn fmt_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Applied => "applied",
        Outcome::Simulated => "simulated",
        Outcome::Skipped => "skipped",
        Outcome::Unmatched => "unmatched",
        Outcome::Failed => "failed",
    }
}
