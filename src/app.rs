//! Application state and logic.

use std::path::{Path, PathBuf};

use crate::data::{ensure_loaded, ContainerInfo, Dataset, Node, TreeReader};
use crate::data_viewer::GridViewerState;
use crate::explorer::ExplorerState;
use crate::recent::RecentFiles;
use crate::store::{ContainerStore, NetcdfStore};

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Gruvbox dark theme.
    GruvboxDark,
    /// Gruvbox light theme.
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// Application state.
#[derive(Debug)]
pub struct App<S: ContainerStore = NetcdfStore> {
    /// Store every file is opened through.
    pub store: S,
    /// Opened containers, in opening order.
    pub containers: Vec<ContainerInfo>,
    /// Explorer state (tree navigation + details).
    pub explorer: ExplorerState,
    /// Grid viewer state.
    pub viewer: GridViewerState,
    /// Recently opened files.
    pub recent: RecentFiles,
    /// Where the recent list is persisted.
    pub recent_path: Option<PathBuf>,
    /// Status message.
    pub status: String,
    /// Current theme.
    pub theme: Theme,
    /// Last error, shown in the status bar until the next success.
    pub error_message: Option<String>,
}

impl<S: ContainerStore> App<S> {
    /// Create a new application instance with nothing open.
    pub fn new(store: S, recent_path: Option<PathBuf>) -> Self {
        let recent = match recent_path.as_deref().map(RecentFiles::load) {
            Some(Ok(recent)) => recent,
            Some(Err(e)) => {
                tracing::warn!("Ignoring recent-files list: {}", e);
                RecentFiles::new()
            },
            None => RecentFiles::new(),
        };

        Self {
            store,
            containers: Vec::new(),
            explorer: ExplorerState::new(),
            viewer: GridViewerState::new(),
            recent,
            recent_path,
            status: "Ready".to_string(),
            theme: Theme::GruvboxDark,
            error_message: None,
        }
    }

    /// Open a container and add its tree. Returns whether it opened.
    pub fn open_file(&mut self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        match TreeReader::read_file(&self.store, path) {
            Ok(container) => {
                self.status = match container.diagnostics.first() {
                    None => format!("{} loaded ({} objects)", name, container.object_count()),
                    Some(first) => format!(
                        "{} loaded with {} problem(s); first: {}",
                        name,
                        container.diagnostics.len(),
                        first
                    ),
                };
                self.containers.push(container);
                self.explorer
                    .reveal_file(&self.containers, self.containers.len() - 1);
                self.error_message = None;
                self.remember(path);
                tracing::info!("File loaded successfully");
                true
            },
            Err(e) => {
                self.error_message = Some(format!("Error loading file: {}", e));
                self.status = format!("Error loading {}", name);
                tracing::error!("Error loading file: {}", e);
                false
            },
        }
    }

    fn remember(&mut self, path: &Path) {
        self.recent.push(path);
        if let Some(recent_path) = &self.recent_path {
            if let Err(e) = self.recent.save(recent_path) {
                tracing::warn!("Could not save recent files: {}", e);
            }
        }
    }

    /// Open the most recent file that is not already open.
    pub fn open_recent(&mut self) {
        let open: Vec<PathBuf> = self
            .containers
            .iter()
            .map(|c| canonical(&c.file_path))
            .collect();
        let next = self
            .recent
            .entries()
            .iter()
            .find(|f| !open.contains(&canonical(f)))
            .cloned();

        match next {
            Some(path) => {
                self.open_file(&path);
            },
            None => self.status = "No other recent files".to_string(),
        }
    }

    /// Get the current node.
    pub fn current_node(&self) -> Option<&Node> {
        self.explorer
            .current_location()?
            .resolve(&self.containers)
    }

    /// Expand the node under the cursor.
    pub fn expand(&mut self) {
        self.explorer.expand_current(&self.containers);
    }

    /// Collapse the node under the cursor.
    pub fn collapse(&mut self) {
        self.explorer.collapse_current(&self.containers);
    }

    /// Toggle preview panel.
    pub fn toggle_preview(&mut self) {
        self.explorer.toggle_preview();
        self.status = if self.explorer.show_preview {
            "Details: ON".to_string()
        } else {
            "Details: OFF".to_string()
        };
    }

    /// Load the current node and show it as a grid.
    pub fn view_current(&mut self) {
        let Some(location) = self.explorer.current_location().cloned() else {
            self.status = "No node selected".to_string();
            return;
        };
        let Some(node) = location.resolve_mut(&mut self.containers) else {
            return;
        };

        if node.is_group() {
            self.status = "Grid view is only available for variables and attributes".to_string();
            return;
        }
        if !node.is_numeric() {
            self.status = format!("{} is not numeric; no grid view", node.name);
            return;
        }

        let title = node.name.clone();
        match ensure_loaded(&self.store, node) {
            Ok(()) => {
                if let Some(dataset) = &node.dataset {
                    self.viewer.open(location, title.clone(), dataset);
                }
                self.explorer.rebuild(&self.containers);
                self.status = format!("Viewing {}", title);
                self.error_message = None;
            },
            Err(e) => {
                tracing::warn!("{}", e);
                self.viewer.set_error(title.clone(), e.to_string());
                self.status = format!("Error loading {}", title);
                self.error_message = Some(e.to_string());
            },
        }
    }

    /// Dataset shown in the grid viewer.
    pub fn viewer_dataset(&self) -> Option<&Dataset> {
        self.viewer
            .location
            .as_ref()?
            .resolve(&self.containers)?
            .dataset
            .as_ref()
    }

    /// Report the active layer after a navigation step.
    pub fn show_layer_status(&mut self) {
        if let Some(label) = self.viewer.layer_label() {
            self.status = label;
        }
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }

    /// Close any open overlays.
    pub fn close_overlay(&mut self) {
        self.viewer.close();
        self.status = "Grid closed".to_string();
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
