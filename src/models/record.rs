//! Parsed NFO record models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// An actor credit as it appears in an NFO document.
///
/// Order within the containing list reflects the curator's billing order
/// and must survive the round trip back to the library service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: Option<String>,
    pub thumb_url: Option<String>,
}

/// Fields common to every NFO variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonFields {
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<u16>,
    pub plot: Option<String>,
    pub rating: Option<f32>,
}

/// A classified NFO record.
///
/// Season and Episode records are meaningless without the show context
/// derived from the directory hierarchy; that context lives in
/// [`HierarchyContext`], not in the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NfoRecord {
    Show {
        #[serde(flatten)]
        common: CommonFields,
        studio: Option<String>,
        mpaa: Option<String>,
        genres: Vec<String>,
        named_seasons: BTreeMap<u16, String>,
        actors: Vec<Actor>,
    },
    Season {
        #[serde(flatten)]
        common: CommonFields,
        season_number: u16,
        episode_count: Option<u32>,
    },
    Episode {
        #[serde(flatten)]
        common: CommonFields,
        season_number: u16,
        episode_number: u16,
    },
    Movie {
        #[serde(flatten)]
        common: CommonFields,
    },
}

impl NfoRecord {
    /// The common field block shared by all variants.
    pub fn common(&self) -> &CommonFields {
        match self {
            NfoRecord::Show { common, .. }
            | NfoRecord::Season { common, .. }
            | NfoRecord::Episode { common, .. }
            | NfoRecord::Movie { common } => common,
        }
    }

    /// Short variant name, used in logs and the inspect command.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NfoRecord::Show { .. } => "show",
            NfoRecord::Season { .. } => "season",
            NfoRecord::Episode { .. } => "episode",
            NfoRecord::Movie { .. } => "movie",
        }
    }

    /// Whether this record needs a show context to be matched.
    pub fn needs_show_context(&self) -> bool {
        matches!(self, NfoRecord::Season { .. } | NfoRecord::Episode { .. })
    }
}

/// Show context for season/episode records, derived from the directory
/// layout during classification and threaded through matching unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyContext {
    /// Title of the owning show.
    pub show_title: String,
    /// Year of the owning show, when the show NFO supplied one.
    pub show_year: Option<u16>,
    /// Directory the context was derived from.
    pub source_dir: PathBuf,
}

/// Optional poster image paired with an NFO by base filename.
///
/// Owned by the filesystem; the engine only ever reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub path: PathBuf,
}

impl MediaAsset {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}
