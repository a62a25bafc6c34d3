//! Container tree reader.
//!
//! Walks the link graph of one container depth first and builds the
//! [`Node`] tree. Per-object failures are logged, recorded as
//! [`Diagnostic`]s and contained; only failing to open the file aborts.

use super::resolve::{resolve_shape_and_type, ObjectRef};
use super::{ContainerInfo, Dataset, Diagnostic, Node, NodeKind, ObjectRegistry};
use crate::error::{Result, StrataError};
use crate::store::{join_path, ContainerHandle, ContainerStore, ObjectKind};
use std::path::Path;
use tracing::{debug, info, warn};

/// Builds node trees from container files.
#[derive(Debug)]
pub struct TreeReader;

impl TreeReader {
    /// Open `path` through `store` and read its whole structure.
    ///
    /// The handle is dropped before returning, so nothing stays open once the
    /// tree has been built.
    pub fn read_file<S: ContainerStore>(store: &S, path: &Path) -> Result<ContainerInfo> {
        let handle = store.open(path).map_err(|e| match e {
            StrataError::Open { .. } => e,
            other => StrataError::open(path, other),
        })?;
        info!("Opened container {}", path.display());

        let mut traversal = Traversal::new(&handle, path);
        traversal.register_root();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mut root = Node::new(NodeKind::Root, name, "/", path);
        root.children = traversal.traverse("/");
        root.children.extend(traversal.resolve_attributes("/"));

        let diagnostics = traversal.diagnostics;
        let container = ContainerInfo::new(path.to_path_buf(), root, diagnostics);
        info!(
            "Read {} objects from {} ({} diagnostics)",
            container.object_count(),
            path.display(),
            container.diagnostics.len()
        );
        Ok(container)
    }
}

/// State carried through one depth-first pass.
struct Traversal<'h, H> {
    handle: &'h H,
    file: &'h Path,
    registry: ObjectRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl<'h, H: ContainerHandle> Traversal<'h, H> {
    fn new(handle: &'h H, file: &'h Path) -> Self {
        Self {
            handle,
            file,
            registry: ObjectRegistry::new(),
            diagnostics: Vec::new(),
        }
    }

    /// A root group linked back into from below must not be descended into again.
    fn register_root(&mut self) {
        match self.handle.object_info("/") {
            Ok(info) => {
                self.registry
                    .record_if_multiply_referenced(info.address, info.reference_count);
            },
            Err(e) => self.contain("/", e),
        }
    }

    fn traverse(&mut self, group_path: &str) -> Vec<Node> {
        let links = match self.handle.iterate_children(group_path) {
            Ok(links) => links,
            Err(e) => {
                self.contain(group_path, e);
                return Vec::new();
            },
        };

        let mut nodes = Vec::with_capacity(links.len());
        for link in links {
            let child_path = join_path(group_path, &link.name);
            let mut node = match link.kind {
                ObjectKind::Group => {
                    let mut group =
                        Node::new(NodeKind::Group, link.name.as_str(), child_path.as_str(), self.file);
                    if self
                        .registry
                        .record_if_multiply_referenced(link.address, link.reference_count)
                    {
                        debug!("Group {} already visited, not descending", child_path);
                    } else {
                        debug!("Descending into group {}", child_path);
                        group.children = self.traverse(&child_path);
                    }
                    group
                },
                ObjectKind::Dataset => {
                    debug!("Dataset {}", child_path);
                    let dataset = self.resolve_dataset(ObjectRef::Dataset { path: &child_path }, &child_path);
                    Node::with_dataset(NodeKind::Variable, link.name.as_str(), self.file, dataset)
                },
                ObjectKind::NamedType => {
                    debug!("Skipping named datatype {}", child_path);
                    continue;
                },
                ObjectKind::Unknown => {
                    warn!("Skipping {}: unknown object kind", child_path);
                    self.diagnostics
                        .push(Diagnostic::new(child_path, "unknown object kind"));
                    continue;
                },
            };
            node.children.extend(self.resolve_attributes(&child_path));
            nodes.push(node);
        }
        nodes
    }

    fn resolve_attributes(&mut self, owner_path: &str) -> Vec<Node> {
        let names = match self.handle.attribute_names(owner_path) {
            Ok(names) => names,
            Err(e) => {
                self.contain(owner_path, e);
                return Vec::new();
            },
        };

        names
            .into_iter()
            .map(|name| {
                let object = ObjectRef::Attribute {
                    owner_path,
                    name: &name,
                };
                let dataset = self.resolve_dataset(object, owner_path);
                Node::with_dataset(NodeKind::Attribute, name.as_str(), self.file, dataset)
            })
            .collect()
    }

    /// Resolve a descriptor, falling back to an Unknown placeholder so the node
    /// stays in the tree.
    fn resolve_dataset(&mut self, object: ObjectRef<'_>, reopen_path: &str) -> Dataset {
        match resolve_shape_and_type(self.handle, object) {
            Ok(shape) => Dataset::new(reopen_path, shape),
            Err(e) => {
                self.contain(&object.display_path(), e);
                Dataset::unresolved(reopen_path)
            },
        }
    }

    fn contain(&mut self, path: &str, error: StrataError) {
        warn!("{}", error);
        self.diagnostics.push(Diagnostic::from_error(path, &error));
    }
}
