//! Error types for the pylo library
//!
//! Almost every per-item failure during a run is absorbed into the run
//! counters rather than propagated; the variants here cover the remaining
//! cases where an operation genuinely cannot continue (orchestration-level
//! failures) plus the `#[from]` conversions used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the pylo library
pub type Result<T> = std::result::Result<T, PyloError>;

/// Main error type for all pylo operations
#[derive(Debug, Error)]
pub enum PyloError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error")]
    WalkDir(#[from] walkdir::Error),

    /// Ran out of attempts to find a free temporary name
    #[error("Could not generate a free temporary name for {path:?}")]
    TempNameExhausted {
        /// Item the temporary name was being generated for
        path: PathBuf,
    },

    /// Application-data directory could not be created
    ///
    /// This is the only fatal orchestration error: without the data
    /// directory neither metadata store can persist anything.
    #[error("Cannot create application data directory: {0:?}")]
    DataDir(PathBuf),

    /// Side-channel metadata read/write failure
    #[error("Sidecar error: {0}")]
    Sidecar(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PyloError {
    /// Create a sidecar error with a custom message
    pub fn sidecar(msg: impl Into<String>) -> Self {
        PyloError::Sidecar(msg.into())
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        PyloError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PyloError::DataDir(PathBuf::from("/nope"));
        assert_eq!(
            err.to_string(),
            "Cannot create application data directory: \"/nope\""
        );
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(PyloError::internal("x"), PyloError::Internal(_)));
        assert!(matches!(PyloError::sidecar("x"), PyloError::Sidecar(_)));
    }
}
