//! Remote library service trait.
//!
//! The engine treats the remote media library as a black box behind this
//! seam. Every method can fail with network or authorization errors from
//! the crate error taxonomy: timeouts surface as `Transient` (retryable),
//! rejected credentials as `Authorization` and an unreachable service as
//! `ServiceUnavailable` (both session-fatal).

use crate::models::item::{FieldValue, ItemKind, LibraryItem};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Remote media-library service.
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// Search the library's index for items of `kind` with the given title.
    ///
    /// The service may return loose matches; the matcher applies the exact
    /// (normalized) title equality policy on top.
    async fn find_by_title(&self, kind: ItemKind, title: &str) -> Result<Vec<LibraryItem>>;

    /// Children of an item: seasons of a show, episodes of a season.
    async fn children_of(&self, item: &LibraryItem) -> Result<Vec<LibraryItem>>;

    /// Re-fetch the item's current field values.
    async fn current_fields(&self, item: &LibraryItem) -> Result<BTreeMap<String, FieldValue>>;

    /// Apply field updates as a single batched request for the item.
    async fn apply_fields(
        &self,
        item: &LibraryItem,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<()>;

    /// Replace the item's poster. Bytes are passed through unchanged and
    /// the operation is idempotent on the remote side.
    async fn upload_poster(&self, item: &LibraryItem, bytes: &[u8]) -> Result<()>;
}
