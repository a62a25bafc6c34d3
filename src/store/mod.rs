//! Container store abstraction.
//!
//! The traversal and loading code never talks to a file format directly. It
//! goes through [`ContainerStore`] to open a file and through the returned
//! [`ContainerHandle`] for every query. Dropping a handle closes it, so every
//! exit path releases what was opened.

mod memory;
mod netcdf_store;

pub use memory::{MemoryContainer, MemoryHandle, MemoryStore, ObjectId};
pub use netcdf_store::{NetcdfHandle, NetcdfStore};

use crate::data::ObjectShape;
use crate::error::Result;
use std::path::Path;

/// Kind of an object reachable through a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Collection of links.
    Group,
    /// Typed array.
    Dataset,
    /// Committed datatype.
    NamedType,
    /// Anything the store cannot classify.
    Unknown,
}

/// One child link of a group, as yielded by [`ContainerHandle::iterate_children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    /// Link name (last path component).
    pub name: String,
    /// Kind of the target object.
    pub kind: ObjectKind,
    /// Stable address of the target object within the file.
    pub address: u64,
    /// Number of hard links pointing at the target object.
    pub reference_count: u32,
}

/// Information about one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Kind of the object.
    pub kind: ObjectKind,
    /// Stable address within the file.
    pub address: u64,
    /// Number of hard links pointing at the object.
    pub reference_count: u32,
    /// Number of attributes attached to the object.
    pub attribute_count: usize,
}

/// Opens container files.
pub trait ContainerStore {
    /// Handle to one open file.
    type Handle: ContainerHandle;

    /// Open a container read-only.
    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// Queries against one open container file.
///
/// Paths are absolute container paths (`/`, `/group_a`, `/group_a/dataset_x`).
pub trait ContainerHandle {
    /// Child links of the group at `group_path`, in increasing name order.
    fn iterate_children(&self, group_path: &str) -> Result<Vec<ChildLink>>;

    /// Kind, address and counts of the object at `path`.
    fn object_info(&self, path: &str) -> Result<ObjectInfo>;

    /// Shape and native element type of the dataset at `path`.
    fn dataset_shape_type(&self, path: &str) -> Result<ObjectShape>;

    /// Entire contents of the dataset at `path` as native-endian bytes.
    fn read_dataset(&self, path: &str) -> Result<Vec<u8>>;

    /// Attribute names on the object at `owner_path`, in creation order.
    fn attribute_names(&self, owner_path: &str) -> Result<Vec<String>>;

    /// Shape and native element type of one attribute.
    fn attribute_shape_type(&self, owner_path: &str, name: &str) -> Result<ObjectShape>;

    /// Entire contents of one attribute as native-endian bytes.
    fn read_attribute(&self, owner_path: &str, name: &str) -> Result<Vec<u8>>;
}

/// Join a group path and a link name into a child path.
pub fn join_path(group_path: &str, name: &str) -> String {
    if group_path == "/" || group_path.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", group_path.trim_end_matches('/'), name)
    }
}

/// Split an absolute container path into its components.
pub fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "a"), "/a");
        assert_eq!(join_path("", "a"), "/a");
        assert_eq!(join_path("/a", "b"), "/a/b");
        assert_eq!(join_path("/a/", "b"), "/a/b");
    }

    #[test]
    fn test_path_components() {
        let parts: Vec<&str> = path_components("/a//b/c").collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
        assert_eq!(path_components("/").count(), 0);
    }
}
