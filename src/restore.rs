//! Restore engine
//!
//! Walks the discovered items of a root and renames each one back to its
//! original name: files from their side-channel metadata, directories from
//! the persisted mapping. Items without stored metadata are skipped - they
//! were never processed by this tool, or the metadata was lost - and
//! directories are never force-matched by name heuristics.
//!
//! Recovered names are sanitized before use, and collisions against
//! whatever now occupies the original path are resolved by appending
//! `" (restored N)"` before the extension.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use crate::mapstore::DirMapStore;
use crate::sidecar::SidecarStore;
use crate::types::RunContext;
use crate::utils::{collision_free_path, sanitize_file_name};

/// Restores items to their original names using the two metadata channels
pub struct RestoreEngine<'a> {
    sidecar: &'a dyn SidecarStore,
    dir_map: &'a mut DirMapStore,
}

impl<'a> RestoreEngine<'a> {
    /// Create a restore engine over the two metadata channels
    pub fn new(sidecar: &'a dyn SidecarStore, dir_map: &'a mut DirMapStore) -> Self {
        RestoreEngine { sidecar, dir_map }
    }

    /// Restore every discovered file with readable side-channel metadata
    #[instrument(skip(self, files, ctx), fields(files = files.len()))]
    pub fn restore_files(&mut self, files: &[PathBuf], ctx: &mut RunContext) {
        for path in files {
            let original = match self.sidecar.read_original_name(path) {
                Ok(Some(name)) => name,
                Ok(None) => {
                    ctx.counters.skipped += 1;
                    continue;
                }
                Err(e) => {
                    // Unreadable metadata is indistinguishable from absent
                    // metadata for our purposes: the file stays put.
                    debug!("Sidecar read failed for {:?}: {}", path, e);
                    ctx.counters.skipped += 1;
                    continue;
                }
            };

            let Some(parent) = path.parent() else {
                ctx.counters.skipped += 1;
                continue;
            };
            let safe = sanitize_file_name(&original);
            if parent.join(&safe) == *path {
                // Already carries its original name; a stale sidecar must
                // not trigger a pointless collision rename.
                ctx.counters.skipped += 1;
                continue;
            }
            let target = collision_free_path(parent, &safe, false);

            if ctx.dry_run {
                ctx.record_change(path, &target);
                ctx.counters.restored += 1;
                continue;
            }

            match fs::rename(path, &target) {
                Ok(()) => {
                    if let Err(e) = self.sidecar.relocate(path, &target) {
                        debug!("Sidecar relocate failed for {:?}: {}", target, e);
                    }
                    // Metadata has served its purpose; best-effort cleanup.
                    if let Err(e) = self.sidecar.clear_original_name(&target) {
                        debug!("Sidecar clear failed for {:?}: {}", target, e);
                    }
                    ctx.record_change(path, &target);
                    ctx.counters.restored += 1;
                }
                Err(e) => {
                    warn!("Restore rename failed for {:?}: {}", path, e);
                    ctx.counters.errors += 1;
                }
            }
        }
    }

    /// Restore every discovered directory present in the mapping
    #[instrument(skip(self, dirs, ctx), fields(dirs = dirs.len()))]
    pub fn restore_dirs(&mut self, dirs: &[PathBuf], ctx: &mut RunContext) {
        let mut map_dirty = false;

        for path in dirs {
            let Some(original) = self.dir_map.get(path).map(str::to_string) else {
                // Not in the mapping: never processed, or already restored
                // on an earlier run.
                ctx.counters.skipped += 1;
                continue;
            };

            let Some(parent) = path.parent() else {
                ctx.counters.skipped += 1;
                continue;
            };
            let safe = sanitize_file_name(&original);
            if parent.join(&safe) == *path {
                ctx.counters.skipped += 1;
                continue;
            }
            let target = collision_free_path(parent, &safe, true);

            if ctx.dry_run {
                ctx.record_change(path, &target);
                ctx.counters.restored += 1;
                continue;
            }

            match fs::rename(path, &target) {
                Ok(()) => {
                    self.dir_map.remove(path);
                    map_dirty = true;
                    ctx.record_change(path, &target);
                    ctx.counters.restored += 1;
                }
                Err(e) => {
                    warn!("Restore rename failed for {:?}: {}", path, e);
                    ctx.counters.errors += 1;
                }
            }
        }

        if map_dirty {
            if let Err(e) = self.dir_map.save() {
                warn!("Could not persist directory map: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidecar::JsonSidecar;
    use crate::types::{RunContext, RunMode};
    use std::path::Path;
    use tempfile::TempDir;

    fn engine_parts(data_dir: &Path) -> (JsonSidecar, DirMapStore) {
        (JsonSidecar::new(data_dir), DirMapStore::load(data_dir))
    }

    #[test]
    fn test_restore_file_from_sidecar() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let generated = root.path().join("pylo.docx");
        fs::write(&generated, b"content").unwrap();
        sidecar
            .write_original_name(&generated, "report.docx")
            .unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map)
            .restore_files(&[generated.clone()], &mut ctx);

        assert_eq!(ctx.counters.restored, 1);
        assert!(root.path().join("report.docx").exists());
        assert!(!generated.exists());
        assert_eq!(ctx.changes, vec!["pylo.docx -> report.docx"]);

        // Sidecar was cleared once the name came back
        assert_eq!(
            sidecar
                .read_original_name(&root.path().join("report.docx"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_file_without_sidecar_is_skipped() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let generated = root.path().join("pylo.docx");
        fs::write(&generated, b"content").unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map)
            .restore_files(&[generated.clone()], &mut ctx);

        assert_eq!(ctx.counters.skipped, 1);
        assert_eq!(ctx.counters.errors, 0);
        assert!(generated.exists());
    }

    #[test]
    fn test_restore_collision_gets_numbered_name() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let generated = root.path().join("pylo.docx");
        fs::write(&generated, b"mine").unwrap();
        sidecar
            .write_original_name(&generated, "report.docx")
            .unwrap();
        // The user recreated the original in the meantime
        fs::write(root.path().join("report.docx"), b"theirs").unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map)
            .restore_files(&[generated], &mut ctx);

        assert_eq!(ctx.counters.restored, 1);
        assert!(root.path().join("report (restored 1).docx").exists());
        assert_eq!(
            fs::read(root.path().join("report.docx")).unwrap(),
            b"theirs"
        );
    }

    #[test]
    fn test_already_restored_file_is_skipped() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        // Stale sidecar on a file already carrying its original name
        let path = root.path().join("report.docx");
        fs::write(&path, b"content").unwrap();
        sidecar.write_original_name(&path, "report.docx").unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map).restore_files(&[path.clone()], &mut ctx);

        assert_eq!(ctx.counters.skipped, 1);
        assert_eq!(ctx.counters.restored, 0);
        assert!(path.exists());
        assert!(!root.path().join("report (restored 1).docx").exists());
    }

    #[test]
    fn test_restore_dir_from_mapping_and_remove_entry() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let generated = root.path().join("pylo");
        fs::create_dir(&generated).unwrap();
        map.insert(&generated, "photos");
        map.save().unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map)
            .restore_dirs(&[generated.clone()], &mut ctx);

        assert_eq!(ctx.counters.restored, 1);
        assert!(root.path().join("photos").is_dir());
        assert_eq!(map.get(&generated), None);

        // Removal was persisted
        let reloaded = DirMapStore::load(data_dir.path());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_dir_not_in_mapping_is_skipped() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let stranger = root.path().join("pylo");
        fs::create_dir(&stranger).unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map)
            .restore_dirs(&[stranger.clone()], &mut ctx);

        assert_eq!(ctx.counters.skipped, 1);
        assert_eq!(ctx.counters.errors, 0);
        assert!(stranger.is_dir());
    }

    #[test]
    fn test_sanitized_name_on_restore() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let generated = root.path().join("pylo.txt");
        fs::write(&generated, b"x").unwrap();
        // A recovered name with separators must not escape the folder
        sidecar
            .write_original_name(&generated, "evil/../name.txt")
            .unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, false);
        RestoreEngine::new(&sidecar, &mut map)
            .restore_files(&[generated], &mut ctx);

        assert_eq!(ctx.counters.restored, 1);
        assert!(root.path().join("evil_.._name.txt").exists());
    }

    #[test]
    fn test_dry_run_reports_without_renaming() {
        let root = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let (sidecar, mut map) = engine_parts(data_dir.path());

        let generated = root.path().join("pylo.docx");
        fs::write(&generated, b"x").unwrap();
        sidecar
            .write_original_name(&generated, "report.docx")
            .unwrap();
        let gen_dir = root.path().join("pylo");
        fs::create_dir(&gen_dir).unwrap();
        map.insert(&gen_dir, "photos");
        map.save().unwrap();

        let mut ctx = RunContext::new(RunMode::Restore, true);
        let mut engine = RestoreEngine::new(&sidecar, &mut map);
        engine.restore_files(&[generated.clone()], &mut ctx);
        engine.restore_dirs(&[gen_dir.clone()], &mut ctx);

        assert_eq!(ctx.counters.restored, 2);
        assert_eq!(
            ctx.changes,
            vec!["pylo.docx -> report.docx", "pylo -> photos"]
        );
        // Nothing moved, mapping untouched
        assert!(generated.exists());
        assert!(gen_dir.is_dir());
        assert_eq!(map.get(&gen_dir), Some("photos"));
    }
}
