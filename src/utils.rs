//! Utility functions for pylo
//!
//! Small filesystem and name-handling helpers shared by the planner, the
//! renamer and the restore engine: existence probing that does not follow
//! symlinks, filesystem-name sanitization, collision-disambiguated name
//! generation and atomic file writing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Characters never allowed in a restored file name
///
/// The superset of characters rejected across the filesystems this tool is
/// expected to meet; anything in this set (plus ASCII control characters)
/// is replaced with `_` on restore.
const INVALID_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Check whether anything exists at `path`, without following symlinks
///
/// `Path::exists` traverses symlinks and reports `false` for a dangling
/// link even though the entry occupies the name; `symlink_metadata` sees
/// the entry itself.
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Replace characters illegal in a filesystem name with underscores
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_NAME_CHARS.contains(&c) || (c as u32) < 0x20 {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Split a name at its last dot into `(stem, extension)`
///
/// A leading dot does not count as an extension separator, so `".config"`
/// has no extension. The extension includes the dot.
pub fn split_at_last_dot(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    }
}

/// Generate a collision-disambiguated path inside `parent`
///
/// Returns `parent/name` if free; otherwise tries
/// `"<stem> (restored N)<ext>"` for N = 1, 2, ... until a free name is
/// found. Directories never get an extension split.
pub fn collision_free_path(parent: &Path, name: &str, is_dir: bool) -> PathBuf {
    let candidate = parent.join(name);
    if !path_exists(&candidate) {
        return candidate;
    }

    let (stem, ext) = if is_dir {
        (name, "")
    } else {
        split_at_last_dot(name)
    };

    let mut n = 1u32;
    loop {
        let candidate = parent.join(format!("{} (restored {}){}", stem, n, ext));
        if !path_exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Atomic file write (write to temp file then rename)
///
/// The target file is never visible in a partially written state; a crash
/// mid-write leaves either the old content or a stray `.tmp` file.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
