//! Recently opened files.
//!
//! Persisted as JSON. Paths that no longer exist are dropped whenever the
//! list is loaded.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maximum number of remembered files.
pub const MAX_RECENT_FILES: usize = 5;

/// Most recently opened files, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFiles {
    #[serde(default)]
    files: Vec<PathBuf>,
}

impl RecentFiles {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the list, `<config dir>/strata/recent.json`.
    pub fn default_location() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("strata").join("recent.json"))
        } else {
            dirs::home_dir().map(|home| home.join(".config").join("strata").join("recent.json"))
        }
    }

    /// Load the list stored at `path`. A missing file yields an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No recent-files list at {}", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let mut recent: Self = serde_json::from_str(&json)?;
        let before = recent.files.len();
        recent.files.retain(|f| f.exists());
        recent.files.truncate(MAX_RECENT_FILES);
        if recent.files.len() != before {
            debug!(
                "Pruned {} stale recent files",
                before - recent.files.len()
            );
        }
        Ok(recent)
    }

    /// Write the list to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved recent files to {}", path.display());
        Ok(())
    }

    /// Move `file` to the front, dropping the oldest entry past the limit.
    pub fn push(&mut self, file: &Path) {
        let file = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
        self.files.retain(|f| *f != file);
        self.files.insert(0, file);
        self.files.truncate(MAX_RECENT_FILES);
    }

    /// Remembered files, newest first.
    pub fn entries(&self) -> &[PathBuf] {
        &self.files
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
