//! Watchlist store.
//!
//! Sole owner of the SteamID -> [`WatchEntry`] map. Every mutation runs under
//! one async mutex together with the write-through persist, so a command and
//! a reconciliation pass touching the same entry never lose each other's
//! update. Callers never hold an entry across an await; they hand in a
//! closure that is applied to the current entry.

pub mod document;
mod entry;

use document::Entries;
pub use entry::WatchEntry;

use crate::error::StoreError;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Result of [`WatchlistStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    AlreadyExists,
    /// Empty or whitespace-only identifier.
    Invalid,
}

/// Result of [`WatchlistStore::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(WatchEntry),
    NotFound,
}

/// Persistent, mutex-guarded watchlist.
pub struct WatchlistStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl WatchlistStore {
    /// Open the store at `path`, loading (or creating) the document.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let (entries, outcome) = document::load(&path).await?;
        info!(
            path = %path.display(),
            count = entries.len(),
            outcome = ?outcome,
            "Watchlist loaded"
        );
        crate::metrics::set_watched(entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Start watching `external_id`. Existing entries are left untouched.
    pub async fn add(&self, external_id: &str, added_by: &str) -> AddOutcome {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return AddOutcome::Invalid;
        }

        let mut entries = self.entries.lock().await;
        if entries.contains_key(external_id) {
            return AddOutcome::AlreadyExists;
        }
        entries.insert(external_id.to_string(), WatchEntry::new(added_by));
        self.persist(&entries).await;
        AddOutcome::Created
    }

    /// Stop watching `external_id`, returning the removed entry.
    pub async fn remove(&self, external_id: &str) -> RemoveOutcome {
        let mut entries = self.entries.lock().await;
        match entries.shift_remove(external_id) {
            Some(prior) => {
                self.persist(&entries).await;
                RemoveOutcome::Removed(prior)
            }
            None => RemoveOutcome::NotFound,
        }
    }

    pub async fn get(&self, external_id: &str) -> Option<WatchEntry> {
        self.entries.lock().await.get(external_id).cloned()
    }

    /// All entries in insertion order.
    pub async fn list_all(&self) -> Vec<(String, WatchEntry)> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Watched identifiers in insertion order.
    pub async fn keys(&self) -> Vec<String> {
        self.entries.lock().await.keys().cloned().collect()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Read-modify-write one entry, then persist the whole document.
    ///
    /// Returns `None` if the entry does not exist (e.g. it was removed).
    #[cfg(test)]
    pub async fn update<F, R>(&self, external_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut WatchEntry) -> R,
    {
        self.update_with(external_id, |entry| (f(entry), true)).await
    }

    /// Read-modify-write one entry; persist only if the closure reports a change.
    pub async fn update_with<F, R>(&self, external_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut WatchEntry) -> (R, bool),
    {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(external_id)?;
        let (result, changed) = f(entry);
        if changed {
            self.persist(&entries).await;
        }
        Some(result)
    }

    /// Write-through persist. Failures are logged; memory stays authoritative.
    async fn persist(&self, entries: &Entries) {
        crate::metrics::set_watched(entries.len());
        if let Err(e) = document::save(&self.path, entries).await {
            error!(path = %self.path.display(), error = %e, "Failed to save watchlist");
            crate::metrics::record_persist_failure(e.error_code());
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
