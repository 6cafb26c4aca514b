//! Update plan models.

use crate::models::item::{FieldValue, LibraryItem};
use crate::models::record::MediaAsset;

/// A single proposed field change.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    /// Remote field name (e.g. "title", "summary", "contentRating").
    pub field: String,
    /// Current remote value, if the item has one.
    pub current: Option<FieldValue>,
    /// Value proposed from the NFO.
    pub proposed: FieldValue,
}

impl FieldDiff {
    /// Human-readable one-line rendering, used for dry-run review and the
    /// interactive prompt.
    pub fn render(&self) -> String {
        match &self.current {
            Some(current) => format!(
                "{}: {} -> {}",
                self.field,
                current.render(),
                self.proposed.render()
            ),
            None => format!("{}: (unset) -> {}", self.field, self.proposed.render()),
        }
    }
}

/// The set of proposed changes for one library item, derived from one NFO.
///
/// Created fresh per file by the planner and consumed exactly once by the
/// executor; never persisted.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub item: LibraryItem,
    /// Ordered field changes. Order follows the planner's field table so
    /// diff rendering is stable across runs.
    pub diffs: Vec<FieldDiff>,
    /// Poster to upload, when the planner attached one.
    pub poster: Option<MediaAsset>,
}

impl UpdatePlan {
    /// A plan with no field changes and no poster is a no-op and must not
    /// generate any remote call.
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty() && self.poster.is_none()
    }

    /// Render every diff line plus the poster action, for review.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.diffs.iter().map(FieldDiff::render).collect();
        if let Some(poster) = &self.poster {
            lines.push(format!("poster: upload {}", poster.path.display()));
        }
        lines
    }
}
