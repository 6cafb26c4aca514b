//! End-to-end reconciliation session tests.
//!
//! Tests cover:
//! - Applying field diffs to a matched movie
//! - Dry-run purity (zero mutating requests)
//! - Idempotence (a second run over synchronized state emits nothing)
//! - Poster pairing with the same-basename sidecar image
//! - Absent NFO fields never clearing remote values
//! - Interactive decline

mod common;

use common::{item, MockLibrary};
use nfo_sync::core::session::{
    AlwaysConfirm, ConfirmPrompt, SessionController, SessionOptions,
};
use nfo_sync::models::item::{fields, FieldValue, ItemKind};
use nfo_sync::models::plan::UpdatePlan;
use nfo_sync::models::summary::Outcome;
use std::fs;
use tempfile::TempDir;

const MOVIE_NFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<movie>
  <title>Heat</title>
  <year>1995</year>
  <plot>A heist crew and a detective circle each other.</plot>
  <rating>8.3</rating>
</movie>"#;

fn live_options() -> SessionOptions {
    SessionOptions {
        dry_run: false,
        interactive: false,
        upload_posters: true,
        always_update_art: false,
    }
}

#[tokio::test]
async fn applies_field_diffs_to_matched_movie() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Heat (1995).nfo"), MOVIE_NFO).unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let summary = controller.run(dir.path()).await.unwrap();

    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);
    assert!(!summary.has_failures());

    let applied = library.applied.lock().unwrap();
    assert_eq!(applied.len(), 1);
    let (id, fields_sent) = &applied[0];
    assert_eq!(id, "m1");
    assert_eq!(
        fields_sent.get(fields::SUMMARY),
        Some(&FieldValue::Text(
            "A heist crew and a detective circle each other.".to_string()
        ))
    );
}

#[tokio::test]
async fn dry_run_emits_zero_mutating_requests() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();
    fs::write(dir.path().join("heat.jpg"), b"jpegdata").unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let options = SessionOptions {
        dry_run: true,
        ..live_options()
    };
    let controller = SessionController::new(&library, &AlwaysConfirm, options);
    let summary = controller.run(dir.path()).await.unwrap();

    // Counted as a would-update, but nothing reached the service.
    assert_eq!(summary.updated, 1);
    assert!(summary.dry_run);
    assert_eq!(library.applied_count(), 0);
    assert_eq!(library.poster_count(), 0);
    assert_eq!(
        summary.outcomes[0].outcome,
        Outcome::Simulated
    );
}

#[tokio::test]
async fn second_run_over_synchronized_state_is_a_noop() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let first = controller.run(dir.path()).await.unwrap();
    assert_eq!(first.updated, 1);
    assert_eq!(library.applied_count(), 1);

    let second = controller.run(dir.path()).await.unwrap();
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 1);
    // No further request was emitted.
    assert_eq!(library.applied_count(), 1);
    assert_eq!(
        second.outcomes[0].detail.as_deref(),
        Some("already synchronized")
    );
}

#[tokio::test]
async fn poster_pairs_only_with_same_basename_image() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();
    fs::write(dir.path().join("heat.jpg"), b"jpegdata").unwrap();
    // Unrelated image in the same directory must not attach.
    fs::write(dir.path().join("fanart.png"), b"pngdata").unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let summary = controller.run(dir.path()).await.unwrap();

    assert_eq!(summary.updated, 1);
    let posters = library.posters.lock().unwrap();
    assert_eq!(posters.len(), 1);
    assert_eq!(posters[0], ("m1".to_string(), b"jpegdata".len()));
}

#[tokio::test]
async fn poster_is_not_reuploaded_when_nothing_changed() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();
    fs::write(dir.path().join("heat.jpg"), b"jpegdata").unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let first = controller.run(dir.path()).await.unwrap();
    assert_eq!(first.updated, 1);
    assert_eq!(library.poster_count(), 1);

    // Second run over unchanged state must emit zero remote mutations.
    let second = controller.run(dir.path()).await.unwrap();
    assert_eq!(second.skipped, 1);
    assert_eq!(library.applied_count(), 1);
    assert_eq!(library.poster_count(), 1);
}

#[tokio::test]
async fn always_update_art_refreshes_poster_without_field_changes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();
    fs::write(dir.path().join("heat.jpg"), b"jpegdata").unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    controller.run(dir.path()).await.unwrap();
    assert_eq!(library.poster_count(), 1);

    let options = SessionOptions {
        always_update_art: true,
        ..live_options()
    };
    let forced = SessionController::new(&library, &AlwaysConfirm, options);
    let summary = forced.run(dir.path()).await.unwrap();

    // Fields are still in sync, only the artwork goes out again.
    assert_eq!(summary.updated, 1);
    assert_eq!(library.applied_count(), 1);
    assert_eq!(library.poster_count(), 2);
}

#[tokio::test]
async fn no_art_disables_poster_upload() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();
    fs::write(dir.path().join("heat.jpg"), b"jpegdata").unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let options = SessionOptions {
        upload_posters: false,
        ..live_options()
    };
    let controller = SessionController::new(&library, &AlwaysConfirm, options);
    let summary = controller.run(dir.path()).await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(library.applied_count(), 1);
    assert_eq!(library.poster_count(), 0);
}

#[tokio::test]
async fn absent_nfo_fields_never_clear_remote_values() {
    let dir = TempDir::new().unwrap();
    // No plot in the file; the remote summary must survive.
    let nfo = r#"<movie><title>Heat</title><year>1994</year></movie>"#;
    fs::write(dir.path().join("heat.nfo"), nfo).unwrap();

    let library = MockLibrary::new();
    let mut movie = item("m1", ItemKind::Movie, "Heat", Some(1995));
    movie.fields.insert(
        fields::SUMMARY.to_string(),
        FieldValue::Text("Existing summary".to_string()),
    );
    movie.fields.insert(
        fields::TITLE.to_string(),
        FieldValue::Text("Heat".to_string()),
    );
    library.add_item(movie);

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let summary = controller.run(dir.path()).await.unwrap();

    // The differing year still goes out, the summary is untouched.
    assert_eq!(summary.updated, 1);
    let applied = library.applied.lock().unwrap();
    let (_, fields_sent) = &applied[0];
    assert!(fields_sent.contains_key(fields::YEAR));
    assert!(!fields_sent.contains_key(fields::SUMMARY));
}

struct DeclineAll;

impl ConfirmPrompt for DeclineAll {
    fn confirm(&self, _plan: &UpdatePlan) -> bool {
        false
    }
}

#[tokio::test]
async fn declined_plan_is_skipped_without_requests() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let options = SessionOptions {
        interactive: true,
        ..live_options()
    };
    let controller = SessionController::new(&library, &DeclineAll, options);
    let summary = controller.run(dir.path()).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(library.applied_count(), 0);
    assert_eq!(
        summary.outcomes[0].detail.as_deref(),
        Some("declined by operator")
    );
}

#[tokio::test]
async fn rejected_authorization_aborts_with_partial_summary() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.nfo"), MOVIE_NFO).unwrap();
    fs::write(dir.path().join("b.nfo"), MOVIE_NFO).unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));
    library
        .reject_authorization
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let summary = controller.run(dir.path()).await.unwrap();

    // The first file fails, the second is never processed.
    assert!(summary.aborted.is_some());
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.outcomes.len(), 1);
    assert!(summary.outcomes[0].path.ends_with("a.nfo"));
    assert_eq!(library.applied_count(), 0);
    assert!(summary.has_failures());
}

#[tokio::test]
async fn malformed_file_is_skipped_and_session_continues() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.nfo"), "<movie><title>Oops</titl></movie>").unwrap();
    fs::write(dir.path().join("heat.nfo"), MOVIE_NFO).unwrap();

    let library = MockLibrary::new();
    library.add_item(item("m1", ItemKind::Movie, "Heat", Some(1995)));

    let controller = SessionController::new(&library, &AlwaysConfirm, live_options());
    let summary = controller.run(dir.path()).await.unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.updated, 1);
    assert!(!summary.has_failures());
}
