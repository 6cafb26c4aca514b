//! Run summary model.

use serde::Serialize;
use std::path::PathBuf;

/// Pipeline stage a file was in when its outcome was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Discovered,
    Parsed,
    Classified,
    Matched,
    Planned,
    Confirmed,
    Executed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Discovered => "discovered",
            Stage::Parsed => "parsed",
            Stage::Classified => "classified",
            Stage::Matched => "matched",
            Stage::Planned => "planned",
            Stage::Confirmed => "confirmed",
            Stage::Executed => "executed",
        };
        write!(f, "{s}")
    }
}

/// Terminal outcome for one NFO file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Field changes (and poster, if planned) were applied remotely.
    Applied,
    /// Dry-run: the plan was computed and rendered but nothing was sent.
    Simulated,
    /// Nothing to do, declined, or a recoverable per-file error.
    Skipped,
    /// No library item could be resolved for the record.
    Unmatched,
    /// The plan was approved but applying it failed.
    Failed,
}

/// Outcome record for one file, with the stage and reason that decided it.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Counts and per-file outcomes for a whole session.
///
/// Mutated only by the session controller; everything else reads it.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub dry_run: bool,
    pub discovered: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Reason the session stopped early, when a session-fatal error hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    pub outcomes: Vec<FileOutcome>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now(),
            dry_run,
            discovered: 0,
            matched: 0,
            unmatched: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            aborted: None,
            outcomes: Vec::new(),
        }
    }

    /// Record that a record resolved to a library item.
    pub fn record_matched(&mut self) {
        self.matched += 1;
    }

    /// Record a terminal outcome for one file.
    pub fn record(&mut self, path: PathBuf, outcome: Outcome, stage: Stage, detail: Option<String>) {
        match outcome {
            Outcome::Applied | Outcome::Simulated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Unmatched => self.unmatched += 1,
            Outcome::Failed => self.failed += 1,
        }
        self.outcomes.push(FileOutcome {
            path,
            outcome,
            stage,
            detail,
        });
    }

    /// Non-zero exit codes derive from this.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
