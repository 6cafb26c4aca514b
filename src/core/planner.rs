//! Diff planner.
//!
//! Compares a record's fields against the matched item's current values
//! and produces an ordered set of proposed changes plus an optional
//! poster-upload action.
//!
//! Policy: a field is proposed only when the NFO value is present
//! (non-empty after trim) AND differs from the remote value under
//! trimmed, case-preserving comparison. NFO data is additive/corrective,
//! never authoritative-by-absence: an omitted field never clears a remote
//! value. List fields (genres, actors) compare as ordered sequences and
//! are replaced wholesale when content or order differs.
//!
//! The poster rides along with field corrections: an item whose fields
//! are already synchronized gets no poster action, so re-running over
//! unchanged state stays mutation-free. `always_update_art` overrides
//! that gate for deliberate artwork refreshes.

use crate::models::item::{fields, FieldValue, LibraryItem};
use crate::models::plan::{FieldDiff, UpdatePlan};
use crate::models::record::{Actor, MediaAsset, NfoRecord};
use crate::utils::text;

/// Build the update plan for one record/item pair.
///
/// `poster` is whatever asset the scanner paired with the NFO; the planner
/// never fetches or compares existing poster bytes, it just carries the
/// replace action through when the plan has field changes (or
/// `always_update_art` is set).
pub fn plan(
    record: &NfoRecord,
    item: &LibraryItem,
    poster: Option<MediaAsset>,
    always_update_art: bool,
) -> UpdatePlan {
    let mut diffs = Vec::new();

    let common = record.common();
    propose_text(&mut diffs, item, fields::TITLE, Some(&common.title));
    propose_text(
        &mut diffs,
        item,
        fields::ORIGINAL_TITLE,
        common.original_title.as_deref(),
    );
    propose_text(&mut diffs, item, fields::SUMMARY, common.plot.as_deref());
    propose_text(
        &mut diffs,
        item,
        fields::YEAR,
        common.year.map(|y| y.to_string()).as_deref(),
    );
    propose_text(
        &mut diffs,
        item,
        fields::RATING,
        common.rating.map(|r| format!("{r:.1}")).as_deref(),
    );

    if let NfoRecord::Show {
        studio,
        mpaa,
        genres,
        actors,
        ..
    } = record
    {
        propose_text(&mut diffs, item, fields::STUDIO, studio.as_deref());
        propose_text(&mut diffs, item, fields::CONTENT_RATING, mpaa.as_deref());
        propose_genres(&mut diffs, item, genres);
        propose_actors(&mut diffs, item, actors);
    }

    let poster = if always_update_art || !diffs.is_empty() {
        poster
    } else {
        None
    };

    UpdatePlan {
        item: item.clone(),
        diffs,
        poster,
    }
}

/// Propose a single-valued field when present and divergent.
fn propose_text(
    diffs: &mut Vec<FieldDiff>,
    item: &LibraryItem,
    field: &str,
    value: Option<&str>,
) {
    let Some(value) = value else { return };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }

    let proposed = FieldValue::Text(trimmed.to_string());
    let current = item.fields.get(field);
    if let Some(current) = current {
        if current.normalized_eq(&proposed) {
            return;
        }
    }
    diffs.push(FieldDiff {
        field: field.to_string(),
        current: current.cloned(),
        proposed,
    });
}

/// Genres are split on combined separators, de-duplicated
/// case-insensitively and compared as an ordered sequence.
fn propose_genres(diffs: &mut Vec<FieldDiff>, item: &LibraryItem, genres: &[String]) {
    let refined = text::split_tags(genres.iter().map(String::as_str));
    if refined.is_empty() {
        return;
    }

    let proposed = FieldValue::List(refined);
    let current = item.fields.get(fields::GENRES);
    if let Some(current) = current {
        if current.normalized_eq(&proposed) {
            return;
        }
    }
    diffs.push(FieldDiff {
        field: fields::GENRES.to_string(),
        current: current.cloned(),
        proposed,
    });
}

/// Actor lists carry billing order; any content or order difference
/// proposes a full replacement, never an element-wise merge.
fn propose_actors(diffs: &mut Vec<FieldDiff>, item: &LibraryItem, actors: &[Actor]) {
    if actors.is_empty() {
        return;
    }

    let proposed = FieldValue::Actors(actors.to_vec());
    let current = item.fields.get(fields::ACTORS);
    if let Some(current) = current {
        if current.normalized_eq(&proposed) {
            return;
        }
    }
    diffs.push(FieldDiff {
        field: fields::ACTORS.to_string(),
        current: current.cloned(),
        proposed,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::ItemKind;
    use crate::models::record::CommonFields;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn movie(title: &str, plot: Option<&str>) -> NfoRecord {
        NfoRecord::Movie {
            common: CommonFields {
                title: title.to_string(),
                plot: plot.map(String::from),
                ..Default::default()
            },
        }
    }

    fn remote_item(fields_map: &[(&str, FieldValue)]) -> LibraryItem {
        LibraryItem {
            id: "1".to_string(),
            kind: ItemKind::Movie,
            title: "Heat".to_string(),
            year: Some(1995),
            index: None,
            fields: fields_map
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_identical_fields_produce_empty_plan() {
        let item = remote_item(&[
            (fields::TITLE, FieldValue::Text("Heat".into())),
            (fields::SUMMARY, FieldValue::Text("A crew of thieves.".into())),
        ]);
        let record = movie("Heat", Some("A crew of thieves."));

        let plan = plan(&record, &item, None, false);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_whitespace_divergence_is_not_a_diff() {
        let item = remote_item(&[(fields::TITLE, FieldValue::Text("Heat ".into()))]);
        let record = movie("  Heat", None);

        let plan = plan(&record, &item, None, false);
        assert!(plan.diffs.is_empty());
    }

    #[test]
    fn test_case_divergence_is_a_diff() {
        // Comparison is case-preserving: a deliberate casing change in the
        // NFO is a real correction.
        let item = remote_item(&[(fields::TITLE, FieldValue::Text("heat".into()))]);
        let record = movie("Heat", None);

        let plan = plan(&record, &item, None, false);
        assert_eq!(plan.diffs.len(), 1);
        assert_eq!(plan.diffs[0].field, fields::TITLE);
    }

    #[test]
    fn test_absent_nfo_field_never_clears_remote_value() {
        let item = remote_item(&[
            (fields::TITLE, FieldValue::Text("Heat".into())),
            (fields::SUMMARY, FieldValue::Text("Existing plot.".into())),
        ]);
        let record = movie("Heat", None);

        let plan = plan(&record, &item, None, false);
        assert!(
            plan.diffs.iter().all(|d| d.field != fields::SUMMARY),
            "missing plot must not propose clearing the remote summary"
        );
    }

    #[test]
    fn test_genre_order_difference_replaces_whole_list() {
        let item = remote_item(&[(
            fields::GENRES,
            FieldValue::List(vec!["Drama".into(), "Crime".into()]),
        )]);
        let record = NfoRecord::Show {
            common: CommonFields {
                title: "Heat".to_string(),
                ..Default::default()
            },
            studio: None,
            mpaa: None,
            genres: vec!["Crime".into(), "Drama".into()],
            named_seasons: BTreeMap::new(),
            actors: vec![],
        };

        let result = plan(&record, &item, None, false);
        let genre_diff = result
            .diffs
            .iter()
            .find(|d| d.field == fields::GENRES)
            .expect("order change must produce a diff");
        assert_eq!(
            genre_diff.proposed,
            FieldValue::List(vec!["Crime".into(), "Drama".into()])
        );
    }

    #[test]
    fn test_combined_genres_are_split_and_deduped() {
        let item = remote_item(&[]);
        let record = NfoRecord::Show {
            common: CommonFields {
                title: "Heat".to_string(),
                ..Default::default()
            },
            studio: None,
            mpaa: None,
            genres: vec!["Action / Adventure".into(), "action".into()],
            named_seasons: BTreeMap::new(),
            actors: vec![],
        };

        let result = plan(&record, &item, None, false);
        let genre_diff = result.diffs.iter().find(|d| d.field == fields::GENRES).unwrap();
        assert_eq!(
            genre_diff.proposed,
            FieldValue::List(vec!["Action".into(), "Adventure".into()])
        );
    }

    #[test]
    fn test_poster_rides_along_with_field_changes() {
        let item = remote_item(&[]);
        let record = movie("Heat", Some("A crew of thieves."));

        let without = plan(&record, &item, None, false);
        assert!(without.poster.is_none());

        let asset = MediaAsset::new(PathBuf::from("/movies/Heat/Heat.jpg"));
        let with = plan(&record, &item, Some(asset), false);
        assert!(with.poster.is_some());
    }

    #[test]
    fn test_poster_dropped_when_fields_already_synchronized() {
        let item = remote_item(&[(fields::TITLE, FieldValue::Text("Heat".into()))]);
        let record = movie("Heat", None);
        let asset = MediaAsset::new(PathBuf::from("/movies/Heat/Heat.jpg"));

        let result = plan(&record, &item, Some(asset.clone()), false);
        assert!(result.poster.is_none());
        assert!(result.is_empty(), "synchronized item must plan nothing");

        let forced = plan(&record, &item, Some(asset), true);
        assert!(forced.poster.is_some());
        assert!(!forced.is_empty(), "forced artwork refresh is a real plan");
    }

    #[test]
    fn test_diff_order_is_stable() {
        let item = remote_item(&[]);
        let record = NfoRecord::Movie {
            common: CommonFields {
                title: "Heat".to_string(),
                original_title: Some("Heat".to_string()),
                year: Some(1995),
                plot: Some("Plot.".to_string()),
                rating: Some(8.3),
            },
        };

        let result = plan(&record, &item, None, false);
        let fields_in_order: Vec<&str> =
            result.diffs.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields_in_order,
            vec![
                fields::TITLE,
                fields::ORIGINAL_TITLE,
                fields::SUMMARY,
                fields::YEAR,
                fields::RATING
            ]
        );
    }
}
