//! NFO discovery scanner.
//!
//! Walks a root directory for NFO sidecar files and resolves the poster
//! image paired with an NFO by base filename.

use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image extensions accepted as poster assets next to an NFO.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Discover all NFO files under a root directory.
///
/// Returns paths in sorted order so a run is restartable and its output
/// stable across invocations.
pub fn discover_nfos(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(crate::Error::PathNotFound(root.display().to_string()));
    }
    if !root.is_dir() {
        return Err(crate::Error::NotADirectory(root.display().to_string()));
    }

    let mut nfos: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("nfo"))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    nfos.sort();

    tracing::info!("Discovered {} NFO files under {}", nfos.len(), root.display());
    Ok(nfos)
}

/// Find the poster image sharing the NFO's base filename, if any.
///
/// `foo.nfo` pairs with `foo.jpg`, `foo.jpeg` or `foo.png` in the same
/// directory; the first extension in declaration order wins.
pub fn sibling_image(nfo_path: &Path) -> Option<PathBuf> {
    let stem = nfo_path.file_stem()?;
    let dir = nfo_path.parent()?;

    for ext in IMAGE_EXTENSIONS {
        let candidate = dir.join(format!("{}.{}", stem.to_string_lossy(), ext));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
