//! Shared fixtures for integration tests.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use nfo_sync::models::item::{FieldValue, ItemKind, LibraryItem};
use nfo_sync::services::library::LibraryService;
use nfo_sync::Result;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory library service that behaves like a small remote index.
///
/// `apply_fields` merges into the stored item so a second reconciliation
/// run sees the updated state. All mutating calls are recorded for
/// assertions.
#[derive(Default)]
pub struct MockLibrary {
    items: Mutex<Vec<LibraryItem>>,
    children: Mutex<HashMap<String, Vec<LibraryItem>>>,
    pub applied: Mutex<Vec<(String, BTreeMap<String, FieldValue>)>>,
    pub posters: Mutex<Vec<(String, usize)>>,
    /// When set, every `apply_fields` call is rejected as unauthorized.
    pub reject_authorization: AtomicBool,
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&self, item: LibraryItem) {
        self.items.lock().unwrap().push(item);
    }

    pub fn add_child(&self, parent_id: &str, child: LibraryItem) {
        self.children
            .lock()
            .unwrap()
            .entry(parent_id.to_string())
            .or_default()
            .push(child);
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    pub fn poster_count(&self) -> usize {
        self.posters.lock().unwrap().len()
    }

    fn all_items(&self) -> Vec<LibraryItem> {
        let mut all = self.items.lock().unwrap().clone();
        for children in self.children.lock().unwrap().values() {
            all.extend(children.iter().cloned());
        }
        all
    }
}

#[async_trait]
impl LibraryService for MockLibrary {
    async fn find_by_title(&self, kind: ItemKind, _title: &str) -> Result<Vec<LibraryItem>> {
        // Deliberately loose: return every item of the kind so the exact
        // title policy is exercised by the caller.
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.kind == kind)
            .cloned()
            .collect())
    }

    async fn children_of(&self, item: &LibraryItem) -> Result<Vec<LibraryItem>> {
        Ok(self
            .children
            .lock()
            .unwrap()
            .get(&item.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn current_fields(&self, item: &LibraryItem) -> Result<BTreeMap<String, FieldValue>> {
        Ok(self
            .all_items()
            .iter()
            .find(|i| i.id == item.id)
            .map(|i| i.fields.clone())
            .unwrap_or_default())
    }

    async fn apply_fields(
        &self,
        item: &LibraryItem,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<()> {
        if self.reject_authorization.load(Ordering::SeqCst) {
            return Err(nfo_sync::Error::Authorization(
                "token rejected".to_string(),
            ));
        }
        self.applied
            .lock()
            .unwrap()
            .push((item.id.clone(), fields.clone()));

        let mut items = self.items.lock().unwrap();
        let mut children = self.children.lock().unwrap();
        let stored = items
            .iter_mut()
            .find(|i| i.id == item.id)
            .or_else(|| {
                children
                    .values_mut()
                    .flat_map(|v| v.iter_mut())
                    .find(|i| i.id == item.id)
            });
        if let Some(stored) = stored {
            for (k, v) in fields {
                stored.fields.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    async fn upload_poster(&self, item: &LibraryItem, bytes: &[u8]) -> Result<()> {
        self.posters
            .lock()
            .unwrap()
            .push((item.id.clone(), bytes.len()));
        Ok(())
    }
}

/// Bare library item with empty fields.
pub fn item(id: &str, kind: ItemKind, title: &str, year: Option<u16>) -> LibraryItem {
    LibraryItem {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        year,
        index: None,
        fields: BTreeMap::new(),
    }
}

/// Season or episode item carrying its number within the parent.
pub fn indexed_item(id: &str, kind: ItemKind, title: &str, index: u32) -> LibraryItem {
    LibraryItem {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        year: None,
        index: Some(index),
        fields: BTreeMap::new(),
    }
}
