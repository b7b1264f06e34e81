//! Bookmark records persisted through the settings store.
//!
//! Bookmarks are structured (title, url) records, kept in insertion order and
//! deduplicated by exact identity. Every mutation persists before it commits:
//! a failed write leaves the in-memory list untouched.

use serde::{Deserialize, Serialize};

use crate::settings::{PersistenceError, SettingsStore};

const BOOKMARKS_KEY: &str = "bookmarks";

/// A saved page: display title plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// `"<title> (<url>)"`, for display only. Never parsed back.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.title, self.url)
    }
}

/// Ordered, deduplicated bookmark list backed by a [`SettingsStore`].
#[derive(Debug)]
pub struct BookmarkStore {
    store: SettingsStore,
    entries: Vec<Bookmark>,
}

impl BookmarkStore {
    /// Load persisted bookmarks. No persisted state reads as an empty list.
    pub fn load(store: SettingsStore) -> Result<Self, PersistenceError> {
        let entries = store.get::<Vec<Bookmark>>(BOOKMARKS_KEY)?.unwrap_or_default();
        Ok(Self { store, entries })
    }

    /// Append `bookmark` unless an identical entry exists. Returns whether the
    /// list changed.
    pub fn add(&mut self, bookmark: Bookmark) -> Result<bool, PersistenceError> {
        if self.entries.contains(&bookmark) {
            return Ok(false);
        }
        let mut next = self.entries.clone();
        next.push(bookmark);
        self.commit(next)?;
        Ok(true)
    }

    /// Remove the entry matching `bookmark`. Absent entries are a no-op.
    pub fn remove(&mut self, bookmark: &Bookmark) -> Result<bool, PersistenceError> {
        match self.entries.iter().position(|b| b == bookmark) {
            Some(index) => self.remove_index(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove by list position. Out-of-range indices are a no-op.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Bookmark>, PersistenceError> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        self.remove_index(index).map(Some)
    }

    fn remove_index(&mut self, index: usize) -> Result<Bookmark, PersistenceError> {
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    // Write-then-commit: memory only changes after the store accepted the list.
    fn commit(&mut self, next: Vec<Bookmark>) -> Result<(), PersistenceError> {
        self.store.set(BOOKMARKS_KEY, &next)?;
        self.entries = next;
        Ok(())
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[Bookmark] {
        &self.entries
    }

    pub fn contains(&self, bookmark: &Bookmark) -> bool {
        self.entries.contains(bookmark)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
