//! Error types for Strata.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Per-object failures (`Resolve`, `Read`) are contained by the traversal and
//! loading code; only `Open` on the root file aborts an operation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;

/// Errors that can occur in Strata.
#[derive(Debug, Error)]
pub enum StrataError {
    /// The container file could not be opened.
    #[error("Failed to open container {path}: {reason}")]
    Open {
        /// File that failed to open.
        path: PathBuf,
        /// Reason reported by the store.
        reason: String,
    },

    /// The shape or datatype of an object could not be determined.
    #[error("Failed to resolve {path}: {reason}")]
    Resolve {
        /// Object path within the container.
        path: String,
        /// Reason reported by the store.
        reason: String,
    },

    /// The bulk read of an object's data failed.
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// Object path within the container.
        path: String,
        /// Reason reported by the store.
        reason: String,
    },

    /// No object exists at the given container path.
    #[error("Object not found: {path}")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },

    /// The node has no data payload (Root or Group).
    #[error("Not a dataset or attribute: {path}")]
    NotADataset {
        /// Container path of the node.
        path: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Recent-file list could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StrataError {
    /// Create an Open error.
    pub fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a Resolve error.
    pub fn resolve(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolve {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a Read error.
    pub fn read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failures_keep_their_class() {
        let err = StrataError::open("/tmp/x.nc", "No such file or directory");
        assert!(matches!(err, StrataError::Open { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to open container /tmp/x.nc: No such file or directory"
        );

        let inner = StrataError::not_found("/g/v");
        let err = StrataError::read("/g/v", inner);
        assert_eq!(err.to_string(), "Failed to read /g/v: Object not found: /g/v");
    }

    #[test]
    fn test_io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StrataError = io.into();
        assert!(matches!(err, StrataError::Io(_)));
    }
}
