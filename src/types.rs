//! Core data types used throughout the pylo library
//!
//! The types in this module represent:
//! - **Work items**: [`RenameItem`] - one file or directory discovered in a
//!   root folder, enriched as it moves through planning and renaming
//! - **Run state**: [`RunContext`], [`RunCounters`] - the explicit per-run
//!   value threaded through every stage (no ambient statics)
//! - **Outcomes**: [`RunReport`] - the structured record handed to whatever
//!   reporting layer sits on top of the core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Kind of filesystem entry a [`RenameItem`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// One file or directory discovered for the current run
///
/// Created during enumeration with only `kind`, `original_path` and
/// `extension_key` known; the planner fills in `final_path` and the
/// two-phase renamer assigns `temp_path`. Items are discarded at the end
/// of the run - only the directory mapping outlives it.
#[derive(Debug, Clone)]
pub struct RenameItem {
    /// File or directory
    pub kind: ItemKind,
    /// Absolute path at discovery time; immutable once recorded
    pub original_path: PathBuf,
    /// Grouping key for generated-name numbering (see `planner`)
    pub extension_key: String,
    /// Unique isolation path, assigned during phase 1
    pub temp_path: Option<PathBuf>,
    /// Planned generated name, assigned by the planner
    pub final_path: Option<PathBuf>,
}

impl RenameItem {
    /// Create an item for a discovered file
    pub fn file(path: PathBuf) -> Self {
        let key = crate::planner::extension_key(&file_name_of(&path));
        RenameItem {
            kind: ItemKind::File,
            original_path: path,
            extension_key: key,
            temp_path: None,
            final_path: None,
        }
    }

    /// Create an item for a discovered directory
    pub fn directory(path: PathBuf) -> Self {
        RenameItem {
            kind: ItemKind::Directory,
            original_path: path,
            extension_key: crate::planner::DIR_SENTINEL.to_string(),
            temp_path: None,
            final_path: None,
        }
    }

    /// Base name of the item at discovery time
    pub fn original_name(&self) -> String {
        file_name_of(&self.original_path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Which operation a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Forward rename: original names to generated names
    Rename,
    /// Restore: generated names back to original names
    Restore,
}

impl RunMode {
    /// Human-readable title for reports
    pub fn title(&self) -> &'static str {
        match self {
            RunMode::Rename => "Pylo Rename",
            RunMode::Restore => "Pylo Restore",
        }
    }
}

/// Aggregate counters for one run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunCounters {
    /// Items successfully renamed (forward mode)
    pub renamed: usize,
    /// Items successfully restored (restore mode)
    pub restored: usize,
    /// Items skipped (locked, missing metadata, already restored, ...)
    pub skipped: usize,
    /// Items that hit an error during processing
    pub errors: usize,
}

/// Per-run state threaded through every stage
///
/// Constructed once per invocation and passed by mutable reference to each
/// component; there is no process-wide mutable state anywhere in the crate.
#[derive(Debug)]
pub struct RunContext {
    /// Operation being performed
    pub mode: RunMode,
    /// When true, no filesystem mutation is allowed anywhere downstream
    pub dry_run: bool,
    /// Aggregate counters
    pub counters: RunCounters,
    /// Ordered `"original-name -> new-name"` lines
    pub changes: Vec<String>,
    /// Wall-clock start time
    pub started: DateTime<Utc>,
    started_at: Instant,
}

impl RunContext {
    /// Create a fresh context for one run
    pub fn new(mode: RunMode, dry_run: bool) -> Self {
        RunContext {
            mode,
            dry_run,
            counters: RunCounters::default(),
            changes: Vec::new(),
            started: Utc::now(),
            started_at: Instant::now(),
        }
    }

    /// Record one `from -> to` change line (base names only)
    pub fn record_change(&mut self, from: &Path, to: &Path) {
        self.changes
            .push(format!("{} -> {}", file_name_of(from), file_name_of(to)));
    }

    /// Consume the context into the final report
    pub fn into_report(self) -> RunReport {
        RunReport {
            mode: self.mode,
            title: self.mode.title().to_string(),
            dry_run: self.dry_run,
            started: self.started,
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
            renamed: self.counters.renamed,
            restored: self.counters.restored,
            skipped: self.counters.skipped,
            errors: self.counters.errors,
            changes: self.changes,
        }
    }
}

/// Structured outcome of one run
///
/// The core always supplies the full untruncated change list; any preview
/// or attachment policy belongs to the reporting layer consuming this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Operation this report describes
    pub mode: RunMode,
    /// Title/mode string, e.g. `"Pylo Rename"`
    pub title: String,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Wall-clock start time
    pub started: DateTime<Utc>,
    /// Elapsed duration in milliseconds
    pub elapsed_ms: u64,
    /// Items renamed
    pub renamed: usize,
    /// Items restored
    pub restored: usize,
    /// Items skipped
    pub skipped: usize,
    /// Items that errored
    pub errors: usize,
    /// Ordered `"original-name -> new-name"` lines
    pub changes: Vec<String>,
}

impl RunReport {
    /// One-line summary in the style of the run counters
    pub fn summary(&self) -> String {
        let prefix = if self.dry_run { "[Dry Run] " } else { "" };
        match self.mode {
            RunMode::Restore => format!(
                "{}Done. Restored={}, Skipped={}, Errors={}",
                prefix, self.restored, self.skipped, self.errors
            ),
            RunMode::Rename => format!(
                "{}Done. Renamed={}, Skipped={}, Errors={}",
                prefix, self.renamed, self.skipped, self.errors
            ),
        }
    }
}
