//! Root-folder enumeration for pylo
//!
//! Lists the immediate children of a root folder, split into files and
//! directories, and takes the pre-run snapshot the planner checks generated
//! names against. Enumeration is strictly non-recursive: the contents of
//! subdirectories are never touched.
//!
//! Entries are silently omitted when they are symlinks (the reparse-point
//! analog on unix), when they are hidden (dot-prefixed), or when their
//! metadata cannot be read; a single bad entry never fails the whole
//! enumeration. Filesystem enumeration order is preserved so runs are
//! reproducible in tests.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::renamer::{TEMP_DIR_SUFFIX, TEMP_FILE_SUFFIX};

/// Immediate children of one root, split by kind
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Child files, in enumeration order
    pub files: Vec<PathBuf>,
    /// Child directories, in enumeration order
    pub dirs: Vec<PathBuf>,
}

/// Enumerate the immediate children of `root`
///
/// Never fails: inaccessible entries are dropped with a debug log. Entry
/// types other than regular files and directories (sockets, fifos, ...)
/// are omitted as well.
pub fn scan(root: &Path) -> ScanResult {
    let mut result = ScanResult::default();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping inaccessible entry under {:?}: {}", root, e);
                continue;
            }
        };

        if is_hidden(entry.file_name()) {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            continue;
        } else if file_type.is_dir() {
            result.dirs.push(entry.into_path());
        } else if file_type.is_file() {
            result.files.push(entry.into_path());
        }
    }

    result
}

/// Snapshot every surviving entry path under `root`
///
/// Includes entries of every type - hidden files and symlinks occupy names
/// just the same - but excludes this tool's own temporary-suffix artifacts
/// so a crashed earlier run cannot poison name planning.
pub fn snapshot(root: &Path) -> HashSet<PathBuf> {
    let mut set = HashSet::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(TEMP_FILE_SUFFIX) || name.ends_with(TEMP_DIR_SUFFIX) {
            continue;
        }
        set.insert(entry.into_path());
    }

    set
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
