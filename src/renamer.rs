//! Two-phase rename execution
//!
//! Every rename runs as original -> temporary -> final. The isolation step
//! writes the original-name sidecar (files) and parks the item under a
//! randomized temporary name that cannot collide with anything on the
//! filesystem; the commit step records directory mappings and moves the
//! item to its planned name. A crash between the phases leaves the item
//! detectable at its temporary name instead of silently lost, and anything
//! still stranded there after commit is marked with a `.leftover` suffix
//! for a future run to reconcile.
//!
//! The plan executes strictly sequentially; one item's failure only ever
//! affects that item.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{PyloError, Result};
use crate::mapstore::DirMapStore;
use crate::sidecar::SidecarStore;
use crate::types::{ItemKind, RenameItem, RunContext};
use crate::utils::path_exists;

/// Temporary-name suffix for isolated files
pub const TEMP_FILE_SUFFIX: &str = ".pylo_tmp";
/// Temporary-name suffix for isolated directories
pub const TEMP_DIR_SUFFIX: &str = ".pylo_tmpdir";
/// Marker suffix for items stranded between phases
pub const LEFTOVER_SUFFIX: &str = ".leftover";

/// Attempts at generating a free randomized temporary name before giving up
const MAX_TEMP_ATTEMPTS: usize = 16;

/// Executes a rename plan in two phases
pub struct TwoPhaseRenamer<'a> {
    sidecar: &'a dyn SidecarStore,
    dir_map: &'a mut DirMapStore,
}

impl<'a> TwoPhaseRenamer<'a> {
    /// Create a renamer over the two metadata channels
    pub fn new(sidecar: &'a dyn SidecarStore, dir_map: &'a mut DirMapStore) -> Self {
        TwoPhaseRenamer { sidecar, dir_map }
    }

    /// Execute the plan, updating counters and change lines in `ctx`
    #[instrument(skip(self, items, ctx), fields(items = items.len()))]
    pub fn execute(&mut self, items: Vec<RenameItem>, ctx: &mut RunContext) {
        // Phase 1: isolate every item under a temporary name. A failure
        // here removes the item from the rest of the run.
        let mut isolated = Vec::with_capacity(items.len());
        for mut item in items {
            match self.isolate(&mut item) {
                Ok(()) => isolated.push(item),
                Err(e) => {
                    warn!("Isolation failed for {:?}: {}", item.original_path, e);
                    ctx.counters.errors += 1;
                    ctx.counters.skipped += 1;
                }
            }
        }

        // Phase 2: commit every isolated item to its planned name.
        let mut map_dirty = false;
        for item in &isolated {
            let Some(temp_path) = item.temp_path.as_deref() else {
                continue;
            };
            if !path_exists(temp_path) {
                ctx.counters.skipped += 1;
                continue;
            }
            let Some(final_path) = item.final_path.as_deref() else {
                warn!("No planned name for {:?}", item.original_path);
                ctx.counters.errors += 1;
                ctx.counters.skipped += 1;
                continue;
            };

            if item.kind == ItemKind::Directory {
                self.dir_map.insert(final_path, &item.original_name());
                map_dirty = true;
            }

            match fs::rename(temp_path, final_path) {
                Ok(()) => {
                    if item.kind == ItemKind::File {
                        if let Err(e) = self.sidecar.relocate(temp_path, final_path) {
                            debug!("Sidecar relocate failed for {:?}: {}", final_path, e);
                        }
                    }
                    ctx.record_change(&item.original_path, final_path);
                    ctx.counters.renamed += 1;
                }
                Err(e) => {
                    warn!("Commit failed for {:?}: {}", item.original_path, e);
                    if item.kind == ItemKind::Directory {
                        self.dir_map.remove(final_path);
                    }
                    ctx.counters.errors += 1;
                    ctx.counters.skipped += 1;
                }
            }
        }

        if map_dirty {
            if let Err(e) = self.dir_map.save() {
                warn!("Could not persist directory map: {}", e);
            }
        }

        // Reconciliation: anything still at its temporary path failed the
        // commit. Park it under a leftover marker so a future scan can
        // find it; errors here are swallowed.
        for item in &isolated {
            let Some(temp_path) = item.temp_path.as_deref() else {
                continue;
            };
            if path_exists(temp_path) {
                let marker = leftover_path(temp_path);
                if !path_exists(&marker) && fs::rename(temp_path, &marker).is_ok() {
                    // Keep the metadata keyed to wherever the item now sits
                    if item.kind == ItemKind::File {
                        if let Err(e) = self.sidecar.relocate(temp_path, &marker) {
                            debug!("Sidecar relocate failed for {:?}: {}", marker, e);
                        }
                    }
                }
            }
        }
    }

    /// Phase 1 for one item: sidecar write, then move to a temporary name
    fn isolate(&self, item: &mut RenameItem) -> Result<()> {
        let suffix = match item.kind {
            ItemKind::File => TEMP_FILE_SUFFIX,
            ItemKind::Directory => TEMP_DIR_SUFFIX,
        };
        let temp_path = make_temp_path(&item.original_path, suffix)?;

        if item.kind == ItemKind::File {
            // Written before the move so the name survives even if the
            // commit phase never runs. A sidecar failure is not fatal to
            // the item: the rename itself still goes ahead, restoration
            // just degrades to a skip later.
            if let Err(e) = self
                .sidecar
                .write_original_name(&item.original_path, &item.original_name())
            {
                warn!("Sidecar write failed for {:?}: {}", item.original_path, e);
            }
        }

        fs::rename(&item.original_path, &temp_path)?;

        if item.kind == ItemKind::File {
            if let Err(e) = self.sidecar.relocate(&item.original_path, &temp_path) {
                debug!("Sidecar relocate failed for {:?}: {}", temp_path, e);
            }
        }

        debug!("Isolated {:?} at {:?}", item.original_path, temp_path);
        item.temp_path = Some(temp_path);
        Ok(())
    }
}

/// Generate a temporary path next to `original` that nothing occupies
///
/// Candidates are `<name>.<random><suffix>`; the randomized component makes
/// a collision essentially impossible, but the existence check retries a
/// bounded number of times anyway rather than looping forever on a
/// misbehaving filesystem.
fn make_temp_path(original: &Path, suffix: &str) -> Result<PathBuf> {
    let parent = original.parent().unwrap_or_else(|| Path::new(""));
    let name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for _ in 0..MAX_TEMP_ATTEMPTS {
        let candidate = parent.join(format!(
            "{}.{}{}",
            name,
            Uuid::new_v4().simple(),
            suffix
        ));
        if !path_exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(PyloError::TempNameExhausted {
        path: original.to_path_buf(),
    })
}

/// Append the leftover marker suffix to a temporary path
fn leftover_path(temp_path: &Path) -> PathBuf {
    let mut s = OsString::from(temp_path.as_os_str());
    s.push(LEFTOVER_SUFFIX);
    PathBuf::from(s)
}
