//! Update executor.
//!
//! Applies an approved plan to the remote item, or records it as a
//! simulated (dry-run) result. An empty plan is a no-op and generates no
//! remote call at all; re-running reconciliation against an already
//! synchronized item therefore emits zero requests.
//!
//! Field updates go out as a single batched request per item. The poster,
//! when planned, is a separate request after the fields succeed; a poster
//! failure does not roll back already-applied fields, it is reported as a
//! partial failure. Transient errors are retried with bounded backoff
//! before being demoted to a per-file failure.

use crate::models::item::FieldValue;
use crate::models::plan::UpdatePlan;
use crate::services::library::LibraryService;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Retry budget for transient service errors.
const MAX_ATTEMPTS: u32 = 3;
/// Base backoff delay; doubles per attempt.
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Outcome of the poster step within a plan execution.
#[derive(Debug, Clone, PartialEq)]
pub enum PosterOutcome {
    /// The plan had no poster action.
    NotPlanned,
    /// Poster uploads were disabled for this run.
    Disabled,
    Uploaded,
    /// Fields applied but the poster did not; partial failure.
    Failed(String),
}

/// Result of executing one plan.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Empty plan; no remote call was made.
    NoOp,
    /// Dry-run: the rendered diff lines that would have been applied.
    Simulated { rendered: Vec<String> },
    /// Live run outcome.
    Applied {
        fields_applied: usize,
        poster: PosterOutcome,
    },
}

impl ExecutionResult {
    /// Whether the result represents a partial failure (fields applied,
    /// poster lost).
    pub fn is_partial_failure(&self) -> bool {
        matches!(
            self,
            ExecutionResult::Applied {
                poster: PosterOutcome::Failed(_),
                ..
            }
        )
    }
}

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Simulate only; zero remote mutations.
    pub dry_run: bool,
    /// Whether poster actions are honored at all.
    pub upload_posters: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            upload_posters: true,
        }
    }
}

/// Plan executor.
pub struct Executor<'a> {
    service: &'a dyn LibraryService,
    config: ExecutorConfig,
}

impl<'a> Executor<'a> {
    pub fn new(service: &'a dyn LibraryService, config: ExecutorConfig) -> Self {
        Self { service, config }
    }

    /// Execute (or simulate) one plan. The plan is consumed: it is never
    /// applied twice.
    pub async fn execute(&self, plan: UpdatePlan) -> Result<ExecutionResult> {
        if plan.is_empty() {
            tracing::debug!("Item {} already synchronized, no request emitted", plan.item.id);
            return Ok(ExecutionResult::NoOp);
        }

        if self.config.dry_run {
            let rendered = plan.render_lines();
            for line in &rendered {
                tracing::info!("[dry-run] {} would apply {}", plan.item.id, line);
            }
            return Ok(ExecutionResult::Simulated { rendered });
        }

        let fields_applied = if plan.diffs.is_empty() {
            0
        } else {
            let batch: BTreeMap<String, FieldValue> = plan
                .diffs
                .iter()
                .map(|d| (d.field.clone(), d.proposed.clone()))
                .collect();
            with_retry(|| self.service.apply_fields(&plan.item, &batch)).await?;
            tracing::info!(
                "Applied {} field update(s) to {} '{}'",
                batch.len(),
                plan.item.kind,
                plan.item.title
            );
            batch.len()
        };

        let poster = match &plan.poster {
            None => PosterOutcome::NotPlanned,
            Some(_) if !self.config.upload_posters => PosterOutcome::Disabled,
            Some(asset) => {
                // Poster failure after applied fields is a partial failure,
                // never a rollback.
                match self.upload_poster_from_disk(&plan, &asset.path).await {
                    Ok(()) => PosterOutcome::Uploaded,
                    Err(e) if e.is_session_fatal() => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            "Poster upload failed for '{}': {}",
                            plan.item.title,
                            e
                        );
                        PosterOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        Ok(ExecutionResult::Applied {
            fields_applied,
            poster,
        })
    }

    async fn upload_poster_from_disk(
        &self,
        plan: &UpdatePlan,
        path: &std::path::Path,
    ) -> Result<()> {
        // Bytes pass through unchanged; no transcoding.
        let bytes = std::fs::read(path)?;
        with_retry(|| self.service.upload_poster(&plan.item, &bytes)).await?;
        tracing::info!(
            "Uploaded poster {} for '{}'",
            path.display(),
            plan.item.title
        );
        Ok(())
    }
}

/// Retry a service call on transient errors with doubling backoff.
///
/// Non-transient errors pass straight through; after the attempt budget
/// is spent the last transient error is returned for the caller to demote
/// to a per-file failure.
pub(crate) async fn with_retry<F, Fut, T>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                let delay = BACKOFF_BASE * 2u32.pow(attempt - 1);
                tracing::warn!(
                    "Transient service error (attempt {attempt}/{MAX_ATTEMPTS}), retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// Demotion helper used by the session controller: a transient error that
// survived its retries becomes a plain per-file failure message.
pub(crate) fn demote_transient(e: Error) -> Error {
    match e {
        Error::Transient(msg) => Error::Other(format!("gave up after {MAX_ATTEMPTS} attempts: {msg}")),
        other => other,
    }
}
