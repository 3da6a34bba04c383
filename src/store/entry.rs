//! Watch entry record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted state for one watched player.
///
/// The handle and display name are write-once caches: their setters only
/// fill an empty slot. `added_by` is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    #[serde(default)]
    added_by: String,
    /// Last observed online (and already notified as such).
    #[serde(rename = "notified", default)]
    is_online: bool,
    /// Last known server; kept after going offline.
    #[serde(rename = "lastServer", default)]
    server_label: Option<String>,
    #[serde(rename = "bmId", default)]
    internal_handle: Option<String>,
    #[serde(rename = "playerName", default)]
    display_name: Option<String>,
    /// Keys this version does not know; written back untouched.
    #[serde(flatten, default)]
    extra: Map<String, Value>,
}

impl WatchEntry {
    /// New entry, offline with nothing resolved.
    pub fn new(added_by: impl Into<String>) -> Self {
        Self {
            added_by: added_by.into(),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn added_by(&self) -> &str {
        &self.added_by
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn server_label(&self) -> Option<&str> {
        self.server_label.as_deref()
    }

    pub fn internal_handle(&self) -> Option<&str> {
        self.internal_handle.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Cache the handle. Returns true only if it was previously unknown.
    pub fn cache_handle(&mut self, handle: &str) -> bool {
        if self.internal_handle.is_some() {
            return false;
        }
        self.internal_handle = Some(handle.to_string());
        true
    }

    /// Cache the display name. Returns true only if it was previously unknown.
    pub fn cache_display_name(&mut self, name: &str) -> bool {
        if self.display_name.is_some() {
            return false;
        }
        self.display_name = Some(name.to_string());
        true
    }

    /// Mark online on `server`.
    pub fn mark_online(&mut self, server: &str) {
        self.is_online = true;
        self.server_label = Some(server.to_string());
    }

    /// Mark offline, keeping the last known server.
    pub fn mark_offline(&mut self) {
        self.is_online = false;
    }

    /// Refresh the server label while staying online. Returns true if it changed.
    pub fn refresh_server_label(&mut self, server: &str) -> bool {
        if self.server_label.as_deref() == Some(server) {
            return false;
        }
        self.server_label = Some(server.to_string());
        true
    }

    /// Display name or the "Unknown" placeholder.
    pub fn name_or_unknown(&self) -> &str {
        self.display_name().unwrap_or("Unknown")
    }

    /// Original adder or the "Unknown" placeholder (older documents may lack it).
    pub fn added_by_or_unknown(&self) -> &str {
        if self.added_by.is_empty() {
            "Unknown"
        } else {
            &self.added_by
        }
    }
}
