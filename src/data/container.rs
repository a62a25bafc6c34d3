//! Loaded container information.

use super::Node;
use crate::error::StrataError;
use std::fmt;
use std::path::PathBuf;

/// A contained, per-object failure recorded while reading a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Container path of the object concerned.
    pub path: String,
    /// What went wrong.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Record `error` against `path`.
    pub fn from_error(path: impl Into<String>, error: &StrataError) -> Self {
        Self::new(path, error.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Information about one opened container file.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Path to the source file.
    pub file_path: PathBuf,
    /// Root node of the tree.
    pub root_node: Node,
    /// Per-object failures contained during traversal.
    pub diagnostics: Vec<Diagnostic>,
}

impl ContainerInfo {
    /// Create a new container info.
    pub fn new(file_path: PathBuf, root_node: Node, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            file_path,
            root_node,
            diagnostics,
        }
    }

    /// Number of groups, variables and attributes below the root.
    pub fn object_count(&self) -> usize {
        self.root_node.descendant_count()
    }
}
