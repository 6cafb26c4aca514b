//! Library item models.
//!
//! A [`LibraryItem`] is an opaque handle into the remote service. The
//! engine never constructs one itself; they are only obtained from the
//! matcher's lookups through the [`crate::services::library::LibraryService`]
//! trait.

use crate::models::record::Actor;
use crate::utils::text;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remote field names shared by the planner and the service adapters.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const ORIGINAL_TITLE: &str = "originalTitle";
    pub const SUMMARY: &str = "summary";
    pub const CONTENT_RATING: &str = "contentRating";
    pub const STUDIO: &str = "studio";
    pub const RATING: &str = "rating";
    pub const YEAR: &str = "year";
    pub const GENRES: &str = "genres";
    pub const ACTORS: &str = "actors";
}

/// Kind of a library item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Movie,
    Show,
    Season,
    Episode,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Movie => write!(f, "movie"),
            ItemKind::Show => write!(f, "show"),
            ItemKind::Season => write!(f, "season"),
            ItemKind::Episode => write!(f, "episode"),
        }
    }
}

/// A field value as held by the remote library service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Actors(Vec<Actor>),
}

impl FieldValue {
    /// Compare two values under the engine's normalization: trimmed,
    /// case-preserving. Lists compare element-wise in order.
    pub fn normalized_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.trim() == b.trim(),
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.trim() == y.trim())
            }
            (FieldValue::Actors(a), FieldValue::Actors(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| {
                        x.name.trim() == y.name.trim()
                            && x.role.as_deref().map(str::trim)
                                == y.role.as_deref().map(str::trim)
                    })
            }
            _ => false,
        }
    }

    /// Short human rendering for diff output.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => format!("'{}'", s.trim()),
            FieldValue::List(v) => format!("[{}]", v.join(", ")),
            FieldValue::Actors(v) => {
                let names: Vec<&str> = v.iter().map(|a| a.name.as_str()).collect();
                format!("[{}]", names.join(", "))
            }
        }
    }
}

/// An addressable entry in the remote library, carrying its current field
/// values as last fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Opaque remote identifier (Plex rating key).
    pub id: String,
    pub kind: ItemKind,
    /// Indexed title as the service knows it.
    pub title: String,
    pub year: Option<u16>,
    /// Season or episode number within the parent, where applicable.
    pub index: Option<u32>,
    /// Current field values keyed by remote field name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl LibraryItem {
    /// Whether this item's indexed title matches `title` under the
    /// matching normalization (trim + case-insensitive).
    pub fn title_matches(&self, title: &str) -> bool {
        text::normalize_title(&self.title) == text::normalize_title(title)
    }
}
