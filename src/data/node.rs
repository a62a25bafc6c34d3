//! Tree node types and structures.

use super::datatype::{element_count, DatatypeClass, ElementType, ObjectShape, Sign};
use std::path::{Path, PathBuf};

/// Type of node in the container hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root node (file level).
    Root,
    /// Group node.
    Group,
    /// Dataset node.
    Variable,
    /// Attribute attached to its parent node.
    Attribute,
}

impl NodeKind {
    /// Display name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Group => "group",
            NodeKind::Variable => "variable",
            NodeKind::Attribute => "attribute",
        }
    }
}

/// How to reinterpret the raw bytes of one array.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Container path used to reopen the element. For attributes this is the
    /// owning object's path.
    pub path: String,
    /// Extents, outermost first. Empty for a scalar.
    pub dims: Vec<usize>,
    /// Native element type.
    pub datatype: ElementType,
    buffer: Option<Box<[u8]>>,
}

impl Dataset {
    /// Create an unloaded dataset descriptor.
    pub fn new(path: impl Into<String>, shape: ObjectShape) -> Self {
        Self {
            path: path.into(),
            dims: shape.dims,
            datatype: shape.datatype,
            buffer: None,
        }
    }

    /// Descriptor for an object whose shape or type could not be resolved.
    pub fn unresolved(path: impl Into<String>) -> Self {
        Self::new(path, ObjectShape::scalar(ElementType::unknown()))
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size in bytes of one element.
    pub fn element_size(&self) -> usize {
        self.datatype.size
    }

    /// Signedness of the element type.
    pub fn sign(&self) -> Sign {
        self.datatype.sign
    }

    /// Class of the element type.
    pub fn datatype_class(&self) -> DatatypeClass {
        self.datatype.class
    }

    /// Total number of elements (1 for a scalar). `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        element_count(&self.dims)
    }

    /// Expected buffer size in bytes. `None` on overflow.
    pub fn byte_len(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.datatype.size)
    }

    /// Whether the values can be decoded for a grid.
    pub fn is_numeric(&self) -> bool {
        self.datatype.class.is_numeric()
    }

    /// The loaded bytes, if any.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Whether the buffer has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    /// Replace the shape and store the loaded bytes. Only the loader calls this,
    /// and only while no buffer is present.
    pub(crate) fn fill(&mut self, shape: ObjectShape, bytes: Vec<u8>) {
        debug_assert!(self.buffer.is_none());
        self.dims = shape.dims;
        self.datatype = shape.datatype;
        self.buffer = Some(bytes.into_boxed_slice());
    }

    /// Short shape/type summary, e.g. `[3, 4] int32`.
    pub fn summary(&self) -> String {
        if self.dims.is_empty() {
            format!("scalar {}", self.datatype.label())
        } else {
            format!("{:?} {}", self.dims, self.datatype.label())
        }
    }
}

/// A node in the container tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Type of node.
    pub kind: NodeKind,
    /// Display label: last path component, attribute name, or file name for the root.
    pub name: String,
    /// Absolute container path used to reopen the object. For attributes this
    /// is the owning object's path.
    pub container_path: String,
    /// File the node was read from.
    pub owning_file: PathBuf,
    /// Payload for Variable and Attribute nodes.
    pub dataset: Option<Dataset>,
    /// Child nodes: sub-groups and datasets first, then attributes.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new node without payload.
    pub fn new(
        kind: NodeKind,
        name: impl Into<String>,
        container_path: impl Into<String>,
        owning_file: &Path,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            container_path: container_path.into(),
            owning_file: owning_file.to_path_buf(),
            dataset: None,
            children: Vec::new(),
        }
    }

    /// Create a Variable or Attribute node carrying `dataset`.
    pub fn with_dataset(
        kind: NodeKind,
        name: impl Into<String>,
        owning_file: &Path,
        dataset: Dataset,
    ) -> Self {
        let mut node = Self::new(kind, name, dataset.path.clone(), owning_file);
        node.dataset = Some(dataset);
        node
    }

    /// Check if this node is a group (or root).
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group | NodeKind::Root)
    }

    /// Check if this node is a variable.
    pub fn is_variable(&self) -> bool {
        self.kind == NodeKind::Variable
    }

    /// Check if this node is an attribute.
    pub fn is_attribute(&self) -> bool {
        self.kind == NodeKind::Attribute
    }

    /// Whether a grid view can be offered for this node.
    pub fn is_numeric(&self) -> bool {
        self.dataset.as_ref().is_some_and(Dataset::is_numeric)
    }

    /// Add a child node.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Follow child indices from this node.
    pub fn child_at(&self, indices: &[usize]) -> Option<&Node> {
        indices
            .iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    /// Follow child indices from this node, mutably.
    pub fn child_at_mut(&mut self, indices: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &i in indices {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Find the first Variable node with the given container path.
    pub fn find_variable_mut(&mut self, path: &str) -> Option<&mut Node> {
        if self.is_variable() && self.container_path == path {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_variable_mut(path))
    }

    /// Get display name with icon and metadata.
    pub fn display_name(&self) -> String {
        let icon = match self.kind {
            NodeKind::Root => "🏠",
            NodeKind::Group => "📂",
            NodeKind::Variable => "🧮",
            NodeKind::Attribute => "🏷️",
        };

        let suffix = match (&self.kind, &self.dataset) {
            (NodeKind::Variable | NodeKind::Attribute, Some(dataset)) => {
                format!(" {}", dataset.summary())
            },
            (NodeKind::Group | NodeKind::Root, _) => {
                format!(" ({})", self.children.len())
            },
            _ => String::new(),
        };

        format!("{} {}{}", icon, self.name, suffix)
    }
}
