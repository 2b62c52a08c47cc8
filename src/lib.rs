//! # Pylo - reversible bulk renaming
//!
//! Pylo replaces every top-level file and directory name inside one or more
//! target folders with a short generated name (`pylo`, `pylo1`, `pylo2`, ...
//! per extension group), while retaining enough metadata to restore every
//! original name exactly - across process restarts, and even when some
//! items could not be processed.
//!
//! ## Architecture
//!
//! Two properties drive the design:
//!
//! - **Atomicity-preserving renames**: every rename executes as
//!   original -> temporary -> final. An interruption between the phases
//!   leaves the item detectable at its temporary name rather than silently
//!   lost, and a later run reconciles stranded items via a `.leftover`
//!   marker.
//! - **Process-independent undo metadata**: files carry their original
//!   name in side-channel metadata that travels with them through renames
//!   (an extended attribute, with a JSON-document fallback); directories
//!   are tracked in a persisted mapping from generated path to original
//!   name. Restoration never depends on in-memory state.
//!
//! Execution is strictly sequential: items are processed one at a time and
//! one item's failure never blocks or rolls back another. Per-item
//! failures land in the run counters; the run itself only fails on
//! orchestration-level errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pylo::PyloBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pylo = PyloBuilder::new()
//!     .root("/home/user/Desktop")
//!     .build()?;
//!
//! // Forward rename
//! let report = pylo.rename()?;
//! println!("{}", report.summary());
//!
//! // ... later, possibly from a fresh process ...
//! let mut pylo = PyloBuilder::new()
//!     .root("/home/user/Desktop")
//!     .build()?;
//! let report = pylo.restore()?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`pylo`]: the [`Pylo`] orchestrator and its builder
//! - [`planner`]: unique generated-name assignment
//! - [`renamer`]: two-phase rename execution and leftover reconciliation
//! - [`restore`]: restoration from stored metadata
//! - [`scanner`]: non-recursive root enumeration and pre-run snapshots
//! - [`locking`]: best-effort in-use probing
//! - [`sidecar`]: per-file original-name metadata
//! - [`mapstore`]: the persisted directory mapping
//! - [`types`]: items, run context and the run report
//! - [`error`]: error types and handling

// Public API modules
pub mod error;
pub mod mapstore;
pub mod planner;
pub mod pylo;
pub mod renamer;
pub mod restore;
pub mod scanner;
pub mod sidecar;
pub mod types;

// Internal modules
pub mod locking;
mod utils;

// Re-export main types for convenience
pub use error::{PyloError, Result};
pub use mapstore::DirMapStore;
pub use pylo::{Pylo, PyloBuilder};
pub use sidecar::{default_sidecar, JsonSidecar, SidecarStore};
pub use types::{ItemKind, RenameItem, RunContext, RunCounters, RunMode, RunReport};

#[cfg(unix)]
pub use sidecar::XattrSidecar;
