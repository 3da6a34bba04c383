//! On-disk watchlist document.
//!
//! A single pretty-printed JSON object keyed by SteamID, rewritten wholesale
//! on every mutation. Key order is preserved across load and save.

use super::WatchEntry;
use crate::error::StoreError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// In-memory form of the document.
pub type Entries = IndexMap<String, WatchEntry>;

/// How the document was obtained at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Parsed an existing document.
    Loaded,
    /// No file existed; an empty one was created.
    Created,
    /// File was empty; replaced with an empty document.
    ResetEmpty,
    /// File was unparsable; replaced with an empty document. Prior data is lost.
    ResetCorrupt,
}

/// Load the document, creating or resetting it as needed.
///
/// Read errors other than "not found" are returned; nothing is overwritten
/// in that case.
pub async fn load(path: &Path) -> Result<(Entries, LoadOutcome), StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Watchlist not found, creating a new one");
            let entries = Entries::new();
            save(path, &entries).await?;
            return Ok((entries, LoadOutcome::Created));
        }
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        warn!(path = %path.display(), "Watchlist was empty, initializing with empty watchlist");
        let entries = Entries::new();
        save(path, &entries).await?;
        return Ok((entries, LoadOutcome::ResetEmpty));
    }

    match serde_json::from_str::<Entries>(&content) {
        Ok(entries) => Ok((entries, LoadOutcome::Loaded)),
        Err(e) => {
            error!(
                path = %path.display(),
                error = %e,
                "Watchlist is unparsable, replacing with an empty watchlist (previous contents discarded)"
            );
            let entries = Entries::new();
            save(path, &entries).await?;
            Ok((entries, LoadOutcome::ResetCorrupt))
        }
    }
}

/// Encode entries as a 4-space indented JSON object.
pub fn encode(entries: &Entries) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut ser)?;
    Ok(buf)
}

/// Write the whole document.
///
/// Writes a sibling temp file and renames it over the target so a crash
/// mid-write leaves the previous document intact.
pub async fn save(path: &Path, entries: &Entries) -> Result<(), StoreError> {
    let bytes = encode(entries)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "watchlist.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
