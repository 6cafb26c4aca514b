//! Record classifier.
//!
//! Selects the record variant from the document's root element name and,
//! for season/episode records, derives the owning show from the directory
//! layout: a `tvshow.nfo` sibling or ancestor wins, the nearest
//! non-season ancestor directory name is the fallback. The derived
//! [`HierarchyContext`] is threaded through matching explicitly instead of
//! being re-inferred at each stage.

use crate::core::parser::{self, NfoDocument};
use crate::models::record::{HierarchyContext, NfoRecord};
use crate::utils::text;
use crate::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// A classified record plus the show context it needs, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub record: NfoRecord,
    /// Present for Season/Episode records, absent for Show/Movie.
    pub context: Option<HierarchyContext>,
}

fn season_dir_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(season[ ._-]*\d+|specials?)$").unwrap())
}

/// Classify a parsed document found at `nfo_path`.
pub fn classify(doc: &NfoDocument, nfo_path: &Path) -> Result<Classified> {
    let record = match doc.root.as_str() {
        "tvshow" => NfoRecord::Show {
            common: common_fields(doc),
            studio: doc.studio.clone(),
            mpaa: doc.mpaa.clone(),
            genres: doc.genres.clone(),
            named_seasons: doc.named_seasons.clone(),
            actors: doc.actors.clone(),
        },
        "seasondetails" => NfoRecord::Season {
            common: common_fields(doc),
            season_number: doc.season_number.ok_or_else(|| {
                Error::Parse("season NFO is missing its <seasonnumber>".to_string())
            })?,
            episode_count: doc.episode_count,
        },
        "episodedetails" => NfoRecord::Episode {
            common: common_fields(doc),
            season_number: doc.season_number.ok_or_else(|| {
                Error::Parse("episode NFO is missing its <season>".to_string())
            })?,
            episode_number: doc.episode_number.ok_or_else(|| {
                Error::Parse("episode NFO is missing its <episode>".to_string())
            })?,
        },
        "movie" => NfoRecord::Movie {
            common: common_fields(doc),
        },
        other => return Err(Error::UnsupportedDocument(other.to_string())),
    };

    let context = if record.needs_show_context() {
        Some(derive_show_context(nfo_path)?)
    } else {
        None
    };

    Ok(Classified { record, context })
}

fn common_fields(doc: &NfoDocument) -> crate::models::record::CommonFields {
    crate::models::record::CommonFields {
        title: doc.title.clone(),
        original_title: doc.original_title.clone(),
        year: doc.year,
        plot: doc.plot.clone(),
        rating: doc.rating,
    }
}

/// Derive the owning show for a season/episode NFO from its directory.
///
/// Walks from the NFO's directory upwards. At each level a `tvshow.nfo`
/// is authoritative: its title (and year) name the show. Otherwise the
/// first directory that is not a season directory names the show by its
/// own name, with any trailing year split off.
fn derive_show_context(nfo_path: &Path) -> Result<HierarchyContext> {
    let start = nfo_path.parent().ok_or_else(|| {
        Error::HierarchyResolution(format!(
            "{} has no parent directory",
            nfo_path.display()
        ))
    })?;

    let mut dir: Option<&Path> = Some(start);
    while let Some(current) = dir {
        let show_nfo = current.join("tvshow.nfo");
        if show_nfo.is_file() {
            match read_show_nfo(&show_nfo) {
                Ok((title, year)) => {
                    return Ok(HierarchyContext {
                        show_title: title,
                        show_year: year,
                        source_dir: current.to_path_buf(),
                    });
                }
                Err(e) => {
                    // A broken show NFO should not mask the directory-name
                    // fallback below.
                    tracing::warn!("Ignoring unreadable {}: {}", show_nfo.display(), e);
                }
            }
        }

        if let Some(name) = current.file_name().and_then(|n| n.to_str()) {
            if !season_dir_re().is_match(name) {
                let (title, year) = text::split_trailing_year(name);
                return Ok(HierarchyContext {
                    show_title: title,
                    show_year: year,
                    source_dir: current.to_path_buf(),
                });
            }
        }

        dir = current.parent();
    }

    Err(Error::HierarchyResolution(format!(
        "no show NFO or show directory found above {}",
        nfo_path.display()
    )))
}

fn read_show_nfo(path: &Path) -> Result<(String, Option<u16>)> {
    let bytes = std::fs::read(path)?;
    let doc = parser::parse(&bytes)?;
    if doc.root != "tvshow" {
        return Err(Error::UnsupportedDocument(doc.root));
    }
    Ok((doc.title, doc.year))
}

/// Convenience used by tests and the inspect command: parse + classify.
pub fn classify_file(nfo_path: &Path) -> Result<Classified> {
    let bytes = std::fs::read(nfo_path)?;
    let doc = parser::parse(&bytes)?;
    classify(&doc, nfo_path)
}
