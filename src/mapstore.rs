//! Directory mapping store
//!
//! Directories cannot reliably carry per-entry side-channel metadata across
//! a move, so their original names are persisted separately: a single JSON
//! object per user profile mapping a directory's *new* absolute path to its
//! original base name. The document lives in the per-user application-data
//! directory, is read once at the start of a run and written back whenever
//! the mapping changes.
//!
//! A missing or corrupt document is treated as empty - losing the mapping
//! degrades restoration for directories but must never make a run fatal.
//! The file is not protected against concurrent runs of the tool; two
//! simultaneous invocations are unsupported and the last writer wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::utils::atomic_write;

/// File name of the mapping document inside the data dir
const DIR_MAP_NAME: &str = "pylo_dirs.orig.json";

/// Persistent mapping from generated directory paths to original names
#[derive(Debug)]
pub struct DirMapStore {
    doc_path: PathBuf,
    entries: HashMap<String, String>,
}

impl DirMapStore {
    /// Load the mapping from the given application-data directory
    ///
    /// Never fails: an absent or unparseable document starts empty.
    pub fn load(data_dir: &Path) -> Self {
        let doc_path = data_dir.join(DIR_MAP_NAME);
        let entries = match std::fs::read_to_string(&doc_path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Directory map unparseable, starting empty: {}", e);
                HashMap::new()
            }),
            Err(e) => {
                debug!("No directory map at {:?} ({}), starting empty", doc_path, e);
                HashMap::new()
            }
        };
        DirMapStore { doc_path, entries }
    }

    /// Look up the original name for a generated directory path
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(&Self::key(path)).map(String::as_str)
    }

    /// Record `path -> original_name`
    pub fn insert(&mut self, path: &Path, original_name: &str) {
        self.entries
            .insert(Self::key(path), original_name.to_string());
    }

    /// Remove the entry for `path`, returning the original name if present
    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.entries.remove(&Self::key(path))
    }

    /// Number of mapped directories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the mapping back to disk atomically
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_vec(&self.entries)?;
        atomic_write(&self.doc_path, &json)
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let data_dir = TempDir::new().unwrap();

        let mut store = DirMapStore::load(data_dir.path());
        assert!(store.is_empty());
        store.insert(Path::new("/desk/pylo"), "photos");
        store.insert(Path::new("/desk/pylo1"), "music");
        store.save().unwrap();

        let mut reloaded = DirMapStore::load(data_dir.path());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(Path::new("/desk/pylo")), Some("photos"));
        assert_eq!(
            reloaded.remove(Path::new("/desk/pylo1")),
            Some("music".to_string())
        );
        assert_eq!(reloaded.remove(Path::new("/desk/pylo1")), None);
    }

    #[test]
    fn test_corrupt_document_starts_empty() {
        let data_dir = TempDir::new().unwrap();
        fs::write(data_dir.path().join(DIR_MAP_NAME), b"{ truncated").unwrap();

        let store = DirMapStore::load(data_dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_document_starts_empty() {
        let data_dir = TempDir::new().unwrap();
        let store = DirMapStore::load(data_dir.path());
        assert!(store.is_empty());
        assert_eq!(store.get(Path::new("/anything")), None);
    }
}
