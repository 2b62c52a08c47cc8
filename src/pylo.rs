//! Main Pylo implementation
//!
//! This module provides the core [`Pylo`] struct, the entry point for both
//! operations: the forward rename (original names to generated names) and
//! the restore (generated names back to originals). It wires the
//! enumeration, lock probing, planning, two-phase renaming and restoration
//! stages together and threads one [`RunContext`] through them, producing a
//! [`RunReport`] per invocation.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use pylo::PyloBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pylo = PyloBuilder::new()
//!     .root("/home/user/Desktop")
//!     .dry_run(true)
//!     .build()?;
//!
//! let report = pylo.rename()?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{PyloError, Result};
use crate::locking;
use crate::mapstore::DirMapStore;
use crate::planner::NamePlanner;
use crate::renamer::TwoPhaseRenamer;
use crate::restore::RestoreEngine;
use crate::scanner;
use crate::sidecar::{default_sidecar, SidecarStore};
use crate::types::{ItemKind, RenameItem, RunContext, RunMode, RunReport};

/// Main struct for rename and restore runs
///
/// Holds the root folders to process, the per-user data directory and the
/// two metadata channels. Construct it through [`PyloBuilder`].
pub struct Pylo {
    roots: Vec<PathBuf>,
    data_dir: PathBuf,
    dry_run: bool,
    sidecar: Box<dyn SidecarStore>,
    dir_map: DirMapStore,
}

impl std::fmt::Debug for Pylo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pylo")
            .field("roots", &self.roots)
            .field("data_dir", &self.data_dir)
            .field("dry_run", &self.dry_run)
            .field("mapped_dirs", &self.dir_map.len())
            .finish()
    }
}

impl Pylo {
    /// Start building a `Pylo` instance
    pub fn builder() -> PyloBuilder {
        PyloBuilder::new()
    }

    /// Application-data directory backing the metadata stores
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Forward rename: replace every processable top-level name in every
    /// root with a generated one
    ///
    /// Per-item failures are absorbed into the report counters; the run as
    /// a whole only fails on orchestration-level errors. In dry-run mode
    /// the identical plan is computed and reported with zero filesystem
    /// mutations.
    #[instrument(skip(self))]
    pub fn rename(&mut self) -> Result<RunReport> {
        let mut ctx = RunContext::new(RunMode::Rename, self.dry_run);
        info!(
            "Starting rename run over {} root(s), dry_run={}",
            self.roots.len(),
            self.dry_run
        );

        for root in self.roots.clone() {
            self.rename_root(&root, &mut ctx);
        }

        Ok(ctx.into_report())
    }

    fn rename_root(&mut self, root: &Path, ctx: &mut RunContext) {
        let scan = scanner::scan(root);
        debug!(
            "Scanned {:?}: {} files, {} dirs",
            root,
            scan.files.len(),
            scan.dirs.len()
        );

        let mut items = Vec::with_capacity(scan.files.len() + scan.dirs.len());
        for path in scan.files {
            if locking::is_locked(&path, ItemKind::File) {
                debug!("Locked, skipping {:?}", path);
                ctx.counters.skipped += 1;
            } else {
                items.push(RenameItem::file(path));
            }
        }
        for path in scan.dirs {
            if locking::is_locked(&path, ItemKind::Directory) {
                debug!("Locked, skipping {:?}", path);
                ctx.counters.skipped += 1;
            } else {
                items.push(RenameItem::directory(path));
            }
        }

        let snapshot = scanner::snapshot(root);
        NamePlanner::new(snapshot).plan(&mut items);

        if ctx.dry_run {
            for item in &items {
                if let Some(final_path) = &item.final_path {
                    ctx.record_change(&item.original_path, final_path);
                    ctx.counters.renamed += 1;
                }
            }
        } else {
            TwoPhaseRenamer::new(self.sidecar.as_ref(), &mut self.dir_map)
                .execute(items, ctx);
        }
    }

    /// Restore: rename every item that carries stored metadata back to its
    /// original name
    #[instrument(skip(self))]
    pub fn restore(&mut self) -> Result<RunReport> {
        let mut ctx = RunContext::new(RunMode::Restore, self.dry_run);
        info!(
            "Starting restore run over {} root(s), dry_run={}",
            self.roots.len(),
            self.dry_run
        );

        for root in self.roots.clone() {
            let scan = scanner::scan(&root);
            let mut engine = RestoreEngine::new(self.sidecar.as_ref(), &mut self.dir_map);
            engine.restore_files(&scan.files, &mut ctx);
            engine.restore_dirs(&scan.dirs, &mut ctx);
        }

        Ok(ctx.into_report())
    }
}

/// Builder for [`Pylo`] instances
#[derive(Default)]
pub struct PyloBuilder {
    roots: Vec<PathBuf>,
    data_dir: Option<PathBuf>,
    dry_run: bool,
    sidecar: Option<Box<dyn SidecarStore>>,
}

impl std::fmt::Debug for PyloBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyloBuilder")
            .field("roots", &self.roots)
            .field("data_dir", &self.data_dir)
            .field("dry_run", &self.dry_run)
            .field("custom_sidecar", &self.sidecar.is_some())
            .finish()
    }
}

impl PyloBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one root folder to process
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Replace the set of root folders
    pub fn roots(mut self, paths: Vec<PathBuf>) -> Self {
        self.roots = paths;
        self
    }

    /// Override the application-data directory (defaults to the per-user
    /// local data dir plus `pylo`)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Compute and report the plan without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Inject a specific sidecar store (tests, exotic platforms)
    pub fn sidecar(mut self, sidecar: Box<dyn SidecarStore>) -> Self {
        self.sidecar = Some(sidecar);
        self
    }

    /// Build the instance
    ///
    /// Creates the application-data directory and loads the directory
    /// mapping. Failure to create the data directory is the one fatal
    /// precondition of a run.
    ///
    /// Root folders are canonicalized here: the metadata stores key items
    /// by absolute path, so two invocations addressing the same folder
    /// through different spellings (`.`, a relative path, a symlink) must
    /// resolve to the same keys.
    pub fn build(self) -> Result<Pylo> {
        if self.roots.is_empty() {
            return Err(PyloError::internal("at least one root folder is required"));
        }

        let mut roots = Vec::with_capacity(self.roots.len());
        for root in self.roots {
            match fs::canonicalize(&root) {
                Ok(abs) => roots.push(abs),
                Err(e) => {
                    // A missing root scans as empty later; keep it as given
                    debug!("Cannot canonicalize {:?} ({}), using as given", root, e);
                    roots.push(root);
                }
            }
        }

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&data_dir).map_err(|_| PyloError::DataDir(data_dir.clone()))?;

        let dir_map = DirMapStore::load(&data_dir);
        let sidecar = self
            .sidecar
            .unwrap_or_else(|| default_sidecar(&data_dir));

        Ok(Pylo {
            roots,
            data_dir,
            dry_run: self.dry_run,
            sidecar,
            dir_map,
        })
    }
}

/// Per-user default application-data directory
fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("pylo"))
        .ok_or_else(|| PyloError::internal("no local data directory for this user"))
}
