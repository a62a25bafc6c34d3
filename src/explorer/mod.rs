//! Explorer feature - container structure exploration.
//!
//! Flattens the trees of all opened files into the visible rows of the tree
//! panel. Rows refer back to their node by [`NodeLocation`], so the tree
//! itself stays owned by the application.

pub mod tree;

use crate::data::{ContainerInfo, Dataset, DatatypeClass, Node, NodeKind};
use std::collections::HashSet;

/// Position of a node: index of its file plus child indices from that
/// file's root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeLocation {
    /// Index into the opened containers.
    pub file: usize,
    /// Child indices, empty for the root.
    pub path: Vec<usize>,
}

impl NodeLocation {
    /// Location of a file's root node.
    pub fn root(file: usize) -> Self {
        Self {
            file,
            path: Vec::new(),
        }
    }

    fn child(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            file: self.file,
            path,
        }
    }

    /// The node at this location.
    pub fn resolve<'a>(&self, containers: &'a [ContainerInfo]) -> Option<&'a Node> {
        containers.get(self.file)?.root_node.child_at(&self.path)
    }

    /// The node at this location, mutably.
    pub fn resolve_mut<'a>(&self, containers: &'a mut [ContainerInfo]) -> Option<&'a mut Node> {
        containers
            .get_mut(self.file)?
            .root_node
            .child_at_mut(&self.path)
    }
}

/// Explorer state - tree navigation and details display.
#[derive(Debug)]
pub struct ExplorerState {
    /// All tree items in display order (only visible items).
    items: Vec<TreeItem>,
    /// Cursor position (index into items).
    cursor: usize,
    /// Expanded nodes.
    expanded: HashSet<NodeLocation>,
    /// Scroll offset for the tree view.
    scroll_offset: usize,
    /// Show preview/details panel.
    pub show_preview: bool,
    /// Preview scroll offset.
    pub preview_scroll: u16,
}

/// A single item in the tree view.
#[derive(Debug, Clone)]
pub struct TreeItem {
    /// Where the node lives.
    pub location: NodeLocation,
    /// Icon, name and shape summary.
    pub label: String,
    /// Kind of the node.
    pub kind: NodeKind,
    /// Nesting level.
    pub level: usize,
    /// Whether this node is expanded.
    pub expanded: bool,
    /// Whether it has children to expand.
    pub has_children: bool,
    /// Whether a grid view can be opened.
    pub numeric: bool,
    /// Shape or type could not be resolved.
    pub unresolved: bool,
    /// Payload has been read.
    pub loaded: bool,
}

impl ExplorerState {
    /// Create a new explorer state.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            expanded: HashSet::new(),
            scroll_offset: 0,
            show_preview: true,
            preview_scroll: 0,
        }
    }

    /// Expand the root of file `file` and put the cursor on it.
    pub fn reveal_file(&mut self, containers: &[ContainerInfo], file: usize) {
        let root = NodeLocation::root(file);
        self.expanded.insert(root.clone());
        self.rebuild(containers);
        if let Some(i) = self.items.iter().position(|item| item.location == root) {
            self.cursor = i;
        }
    }

    /// Rebuild the visible items list based on expanded state.
    pub fn rebuild(&mut self, containers: &[ContainerInfo]) {
        self.items.clear();
        for (file, container) in containers.iter().enumerate() {
            self.add_visible_recursive(&container.root_node, NodeLocation::root(file), 0);
        }
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
    }

    fn add_visible_recursive(&mut self, node: &Node, location: NodeLocation, level: usize) {
        let expanded = self.expanded.contains(&location);

        self.items.push(TreeItem {
            location: location.clone(),
            label: node.display_name(),
            kind: node.kind,
            level,
            expanded,
            has_children: !node.children.is_empty(),
            numeric: node.is_numeric(),
            unresolved: node
                .dataset
                .as_ref()
                .is_some_and(|d| d.datatype_class() == DatatypeClass::Unknown),
            loaded: node.dataset.as_ref().is_some_and(Dataset::is_loaded),
        });

        if expanded {
            for (i, child) in node.children.iter().enumerate() {
                self.add_visible_recursive(child, location.child(i), level + 1);
            }
        }
    }

    /// Move the cursor up one position.
    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.preview_scroll = 0;
        }
    }

    /// Move the cursor down one position.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
            self.preview_scroll = 0;
        }
    }

    /// Adjust scroll to keep cursor visible.
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        }

        if self.cursor >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor.saturating_sub(viewport_height - 1);
        }
    }

    /// Get the current scroll offset.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Expand the node at the current cursor position.
    pub fn expand_current(&mut self, containers: &[ContainerInfo]) {
        if let Some(item) = self.items.get(self.cursor) {
            if item.has_children && !item.expanded {
                self.expanded.insert(item.location.clone());
                self.rebuild(containers);
            }
        }
    }

    /// Collapse the node at the current cursor position.
    pub fn collapse_current(&mut self, containers: &[ContainerInfo]) {
        if let Some(item) = self.items.get(self.cursor) {
            if item.expanded {
                self.expanded.remove(&item.location);
                self.rebuild(containers);
            }
        }
    }

    /// Go to the first item.
    pub fn goto_first(&mut self) {
        self.cursor = 0;
    }

    /// Go to the last visible item.
    pub fn goto_last(&mut self) {
        if !self.items.is_empty() {
            self.cursor = self.items.len() - 1;
        }
    }

    /// Get all currently visible items in the tree.
    pub fn visible_items(&self) -> &[TreeItem] {
        &self.items
    }

    /// Get the current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Location of the item under the cursor.
    pub fn current_location(&self) -> Option<&NodeLocation> {
        self.items.get(self.cursor).map(|item| &item.location)
    }

    /// Toggle preview panel.
    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    /// Scroll preview down.
    pub fn scroll_down(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_add(5);
    }

    /// Scroll preview up.
    pub fn scroll_up(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_sub(5);
    }
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, ObjectShape};
    use std::path::{Path, PathBuf};

    fn container(name: &str) -> ContainerInfo {
        let file = Path::new(name);
        let mut root = Node::new(NodeKind::Root, name, "/", file);
        let mut group = Node::new(NodeKind::Group, "g", "/g", file);
        group.add_child(Node::with_dataset(
            NodeKind::Variable,
            "x",
            file,
            Dataset::new("/g/x", ObjectShape::of::<f32>(vec![2])),
        ));
        root.add_child(group);
        root.add_child(Node::with_dataset(
            NodeKind::Variable,
            "bad",
            file,
            Dataset::unresolved("/bad"),
        ));
        ContainerInfo::new(PathBuf::from(name), root, Vec::new())
    }

    #[test]
    fn test_reveal_and_expand() {
        let containers = vec![container("a.h5"), container("b.h5")];
        let mut explorer = ExplorerState::new();
        explorer.reveal_file(&containers, 1);

        // a.h5 collapsed, b.h5 expanded with g and bad
        assert_eq!(explorer.visible_items().len(), 4);
        assert_eq!(explorer.cursor(), 1);

        explorer.cursor_down();
        explorer.expand_current(&containers);
        assert_eq!(explorer.visible_items().len(), 5);

        explorer.cursor_down();
        let location = explorer.current_location().unwrap().clone();
        assert_eq!(location, NodeLocation { file: 1, path: vec![0, 0] });
        let node = location.resolve(&containers).unwrap();
        assert_eq!(node.name, "x");
        assert!(explorer.visible_items()[explorer.cursor()].numeric);
    }

    #[test]
    fn test_unresolved_nodes_are_listed() {
        let containers = vec![container("a.h5")];
        let mut explorer = ExplorerState::new();
        explorer.reveal_file(&containers, 0);
        let bad = explorer.visible_items().last().unwrap();
        assert!(bad.unresolved);
        assert!(!bad.numeric);
    }

    #[test]
    fn test_collapse() {
        let containers = vec![container("a.h5")];
        let mut explorer = ExplorerState::new();
        explorer.reveal_file(&containers, 0);
        explorer.collapse_current(&containers);
        assert_eq!(explorer.visible_items().len(), 1);
    }
}
