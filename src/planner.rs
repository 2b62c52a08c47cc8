//! Name planning
//!
//! Deterministically assigns every item its generated target name. Names
//! follow the `pylo` / `pylo<N>` scheme with one independent counter per
//! `(parent folder, extension key)` group: files of the same compound
//! extension share a sequence, directories run their own sequence under a
//! sentinel key that no real extension can collide with.
//!
//! A candidate is accepted only if it collides with neither the pre-run
//! snapshot of the folder nor a name assigned earlier in the same pass.
//! On collision the counter advances and the group retries; a counter
//! value is never reused, which guarantees termination and duplicate-free
//! assignment even under adversarial pre-existing names.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::types::{ItemKind, RenameItem};

/// Base of every generated name
pub const GENERATED_BASE: &str = "pylo";

/// Extension-group sentinel for directories, distinct from any real
/// extension key (which always starts with a dot or is empty)
pub const DIR_SENTINEL: &str = "<DIR>";

/// Extension key of a file name: everything from the first dot onward
///
/// First-dot splitting groups multi-dot names by their full compound
/// extension, so `archive.tar.gz` keys as `.tar.gz`. Names without a dot
/// key as the empty string.
pub fn extension_key(name: &str) -> String {
    match name.find('.') {
        Some(i) => name[i..].to_string(),
        None => String::new(),
    }
}

/// Assigns unique generated names against a pre-run snapshot
#[derive(Debug)]
pub struct NamePlanner {
    snapshot: HashSet<PathBuf>,
    assigned: HashSet<PathBuf>,
    next_index: HashMap<(PathBuf, String), u32>,
}

impl NamePlanner {
    /// Create a planner over the folder snapshot taken at run start
    pub fn new(snapshot: HashSet<PathBuf>) -> Self {
        NamePlanner {
            snapshot,
            assigned: HashSet::new(),
            next_index: HashMap::new(),
        }
    }

    /// Populate `final_path` for every item, in order
    pub fn plan(&mut self, items: &mut [RenameItem]) {
        for item in items {
            self.assign(item);
        }
    }

    fn assign(&mut self, item: &mut RenameItem) {
        let parent = item
            .original_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();
        let group = (parent.clone(), item.extension_key.clone());

        loop {
            let idx = {
                let counter = self.next_index.entry(group.clone()).or_insert(0);
                let value = *counter;
                *counter += 1;
                value
            };

            let base = if idx == 0 {
                GENERATED_BASE.to_string()
            } else {
                format!("{}{}", GENERATED_BASE, idx)
            };
            let name = match item.kind {
                ItemKind::File => format!("{}{}", base, item.extension_key),
                ItemKind::Directory => base,
            };
            let candidate = parent.join(name);

            if !self.snapshot.contains(&candidate) && !self.assigned.contains(&candidate) {
                trace!("Planned {:?} -> {:?}", item.original_path, candidate);
                self.assigned.insert(candidate.clone());
                item.final_path = Some(candidate);
                return;
            }
        }
    }
}
