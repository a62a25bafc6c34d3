//! In-memory container store.
//!
//! Builds containers object by object, including hard links that make a group
//! reachable from more than one parent (and so can form cycles). Failures can
//! be injected per object to exercise the contained-failure paths, and opens
//! and reads are counted.

use super::{
    join_path, path_components, ChildLink, ContainerHandle, ContainerStore, ObjectInfo,
    ObjectKind,
};
use crate::data::ObjectShape;
use crate::error::{Result, StrataError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const BASE_ADDRESS: u64 = 0x800;
const ADDRESS_STRIDE: u64 = 0x60;

/// Identifier of an object inside a [`MemoryContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// The root group.
    pub const ROOT: ObjectId = ObjectId(0);
}

#[derive(Debug)]
enum Body {
    Group { links: Vec<(String, ObjectId)> },
    Dataset { shape: ObjectShape, data: Vec<u8> },
    NamedType,
}

#[derive(Debug)]
struct Attribute {
    name: String,
    shape: ObjectShape,
    data: Vec<u8>,
}

#[derive(Debug)]
struct Object {
    body: Body,
    attributes: Vec<Attribute>,
}

/// A container held entirely in memory.
#[derive(Debug)]
pub struct MemoryContainer {
    objects: Vec<Object>,
    broken_shapes: HashSet<String>,
    failing_reads: Mutex<HashMap<String, usize>>,
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContainer {
    /// Create a container holding only an empty root group.
    pub fn new() -> Self {
        Self {
            objects: vec![Object {
                body: Body::Group { links: Vec::new() },
                attributes: Vec::new(),
            }],
            broken_shapes: HashSet::new(),
            failing_reads: Mutex::new(HashMap::new()),
        }
    }

    /// Create a group named `name` under the group at `parent`.
    pub fn add_group(&mut self, parent: &str, name: &str) -> Result<ObjectId> {
        self.insert(
            parent,
            name,
            Body::Group { links: Vec::new() },
        )
    }

    /// Create a dataset named `name` under the group at `parent`.
    pub fn add_dataset(
        &mut self,
        parent: &str,
        name: &str,
        shape: ObjectShape,
        data: Vec<u8>,
    ) -> Result<ObjectId> {
        self.insert(parent, name, Body::Dataset { shape, data })
    }

    /// Create a committed datatype named `name` under the group at `parent`.
    pub fn add_named_type(&mut self, parent: &str, name: &str) -> Result<ObjectId> {
        self.insert(parent, name, Body::NamedType)
    }

    /// Add a hard link `name` under `parent` pointing at an existing object.
    pub fn link(&mut self, parent: &str, name: &str, target: ObjectId) -> Result<()> {
        if target.0 >= self.objects.len() {
            return Err(StrataError::not_found(format!("object #{}", target.0)));
        }
        let parent_id = self.resolve(parent)?;
        self.push_link(parent, parent_id, name, target)
    }

    /// Attach an attribute to the object at `owner`.
    pub fn add_attribute(
        &mut self,
        owner: &str,
        name: &str,
        shape: ObjectShape,
        data: Vec<u8>,
    ) -> Result<()> {
        let id = self.resolve(owner)?;
        let object = &mut self.objects[id.0];
        if object.attributes.iter().any(|a| a.name == name) {
            return Err(StrataError::resolve(
                join_path(owner, name),
                "attribute already exists",
            ));
        }
        object.attributes.push(Attribute {
            name: name.to_string(),
            shape,
            data,
        });
        Ok(())
    }

    /// Make shape/type queries for the dataset at `path` fail.
    pub fn fail_shape(&mut self, path: &str) {
        self.broken_shapes.insert(path.to_string());
    }

    /// Make shape/type queries for one attribute fail.
    pub fn fail_attribute_shape(&mut self, owner: &str, name: &str) {
        self.broken_shapes.insert(attribute_key(owner, name));
    }

    /// Make the next `times` reads of the dataset at `path` fail.
    pub fn fail_reads(&mut self, path: &str, times: usize) {
        self.failing_reads_mut().insert(path.to_string(), times);
    }

    /// Make the next `times` reads of one attribute fail.
    pub fn fail_attribute_reads(&mut self, owner: &str, name: &str, times: usize) {
        self.failing_reads_mut()
            .insert(attribute_key(owner, name), times);
    }

    /// Number of groups, datasets and attributes reachable from the root,
    /// counting every object once.
    pub fn object_count(&self) -> usize {
        let mut seen = HashSet::new();
        let mut stack = vec![ObjectId::ROOT];
        let mut count = self.objects[0].attributes.len();
        seen.insert(ObjectId::ROOT);
        while let Some(id) = stack.pop() {
            if let Body::Group { links } = &self.objects[id.0].body {
                for (_, target) in links {
                    if seen.insert(*target) {
                        let object = &self.objects[target.0];
                        if !matches!(object.body, Body::NamedType) {
                            count += 1 + object.attributes.len();
                        }
                        stack.push(*target);
                    }
                }
            }
        }
        count
    }

    fn failing_reads_mut(&mut self) -> &mut HashMap<String, usize> {
        match self.failing_reads.get_mut() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn insert(&mut self, parent: &str, name: &str, body: Body) -> Result<ObjectId> {
        let parent_id = self.resolve(parent)?;
        let id = ObjectId(self.objects.len());
        self.objects.push(Object {
            body,
            attributes: Vec::new(),
        });
        self.push_link(parent, parent_id, name, id)?;
        Ok(id)
    }

    fn push_link(
        &mut self,
        parent: &str,
        parent_id: ObjectId,
        name: &str,
        target: ObjectId,
    ) -> Result<()> {
        if name.is_empty() || name.contains('/') {
            return Err(StrataError::resolve(
                join_path(parent, name),
                "invalid link name",
            ));
        }
        match &mut self.objects[parent_id.0].body {
            Body::Group { links } => {
                if links.iter().any(|(n, _)| n == name) {
                    return Err(StrataError::resolve(
                        join_path(parent, name),
                        "link already exists",
                    ));
                }
                links.push((name.to_string(), target));
                Ok(())
            },
            _ => Err(StrataError::resolve(parent, "not a group")),
        }
    }

    fn resolve(&self, path: &str) -> Result<ObjectId> {
        let mut current = ObjectId::ROOT;
        for component in path_components(path) {
            let Body::Group { links } = &self.objects[current.0].body else {
                return Err(StrataError::not_found(path));
            };
            current = links
                .iter()
                .find(|(name, _)| name == component)
                .map(|(_, id)| *id)
                .ok_or_else(|| StrataError::not_found(path))?;
        }
        Ok(current)
    }

    fn address(id: ObjectId) -> u64 {
        BASE_ADDRESS + id.0 as u64 * ADDRESS_STRIDE
    }

    fn reference_count(&self, id: ObjectId) -> u32 {
        let links = self
            .objects
            .iter()
            .filter_map(|o| match &o.body {
                Body::Group { links } => Some(links),
                _ => None,
            })
            .flatten()
            .filter(|(_, target)| *target == id)
            .count() as u32;
        if id == ObjectId::ROOT {
            links + 1
        } else {
            links
        }
    }

    fn kind(&self, id: ObjectId) -> ObjectKind {
        match self.objects[id.0].body {
            Body::Group { .. } => ObjectKind::Group,
            Body::Dataset { .. } => ObjectKind::Dataset,
            Body::NamedType => ObjectKind::NamedType,
        }
    }

    fn attribute(&self, owner: &str, name: &str) -> Result<&Attribute> {
        let id = self.resolve(owner)?;
        self.objects[id.0]
            .attributes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| StrataError::not_found(attribute_key(owner, name)))
    }

    fn take_read_failure(&self, key: &str) -> bool {
        let mut failing = match self.failing_reads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match failing.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            },
            _ => false,
        }
    }
}

fn attribute_key(owner: &str, name: &str) -> String {
    format!("{}@{}", owner, name)
}

/// A set of in-memory containers addressed by file path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: HashMap<PathBuf, Arc<MemoryContainer>>,
    opens: AtomicUsize,
    reads: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `container` under `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, container: MemoryContainer) {
        self.files.insert(path.into(), Arc::new(container));
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of bulk reads attempted so far (datasets and attributes).
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ContainerStore for MemoryStore {
    type Handle = MemoryHandle;

    fn open(&self, path: &Path) -> Result<MemoryHandle> {
        let container = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StrataError::open(path, "no such container"))?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryHandle {
            container,
            reads: Arc::clone(&self.reads),
        })
    }
}

/// Open handle to a [`MemoryContainer`].
#[derive(Debug)]
pub struct MemoryHandle {
    container: Arc<MemoryContainer>,
    reads: Arc<AtomicUsize>,
}

impl ContainerHandle for MemoryHandle {
    fn iterate_children(&self, group_path: &str) -> Result<Vec<ChildLink>> {
        let c = &self.container;
        let id = c.resolve(group_path)?;
        let Body::Group { links } = &c.objects[id.0].body else {
            return Err(StrataError::resolve(group_path, "not a group"));
        };
        let mut children: Vec<ChildLink> = links
            .iter()
            .map(|(name, target)| ChildLink {
                name: name.clone(),
                kind: c.kind(*target),
                address: MemoryContainer::address(*target),
                reference_count: c.reference_count(*target),
            })
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn object_info(&self, path: &str) -> Result<ObjectInfo> {
        let c = &self.container;
        let id = c.resolve(path)?;
        Ok(ObjectInfo {
            kind: c.kind(id),
            address: MemoryContainer::address(id),
            reference_count: c.reference_count(id),
            attribute_count: c.objects[id.0].attributes.len(),
        })
    }

    fn dataset_shape_type(&self, path: &str) -> Result<ObjectShape> {
        let c = &self.container;
        let id = c.resolve(path)?;
        if c.broken_shapes.contains(path) {
            return Err(StrataError::resolve(path, "dataspace query failed"));
        }
        match &c.objects[id.0].body {
            Body::Dataset { shape, .. } => Ok(shape.clone()),
            _ => Err(StrataError::resolve(path, "not a dataset")),
        }
    }

    fn read_dataset(&self, path: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let c = &self.container;
        let id = c.resolve(path)?;
        if c.take_read_failure(path) {
            return Err(StrataError::read(path, "injected read failure"));
        }
        match &c.objects[id.0].body {
            Body::Dataset { data, .. } => Ok(data.clone()),
            _ => Err(StrataError::read(path, "not a dataset")),
        }
    }

    fn attribute_names(&self, owner_path: &str) -> Result<Vec<String>> {
        let c = &self.container;
        let id = c.resolve(owner_path)?;
        Ok(c.objects[id.0]
            .attributes
            .iter()
            .map(|a| a.name.clone())
            .collect())
    }

    fn attribute_shape_type(&self, owner_path: &str, name: &str) -> Result<ObjectShape> {
        let c = &self.container;
        let attribute = c.attribute(owner_path, name)?;
        if c.broken_shapes.contains(&attribute_key(owner_path, name)) {
            return Err(StrataError::resolve(
                attribute_key(owner_path, name),
                "datatype query failed",
            ));
        }
        Ok(attribute.shape.clone())
    }

    fn read_attribute(&self, owner_path: &str, name: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let c = &self.container;
        let attribute = c.attribute(owner_path, name)?;
        let key = attribute_key(owner_path, name);
        if c.take_read_failure(&key) {
            return Err(StrataError::read(key, "injected read failure"));
        }
        Ok(attribute.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encode_native;

    fn sample() -> MemoryContainer {
        let mut c = MemoryContainer::new();
        c.add_group("/", "b").unwrap();
        c.add_group("/", "a").unwrap();
        c.add_dataset(
            "/a",
            "x",
            ObjectShape::of::<i32>(vec![2]),
            encode_native(&[1i32, 2]),
        )
        .unwrap();
        c
    }

    #[test]
    fn test_children_sorted_by_name() {
        let mut store = MemoryStore::new();
        store.insert("f.h5", sample());
        let handle = store.open(Path::new("f.h5")).unwrap();
        let names: Vec<String> = handle
            .iterate_children("/")
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_hard_link_raises_reference_count() {
        let mut c = sample();
        let a = c.resolve("/a").unwrap();
        c.link("/b", "alias", a).unwrap();
        let mut store = MemoryStore::new();
        store.insert("f.h5", c);
        let handle = store.open(Path::new("f.h5")).unwrap();

        let first = handle.object_info("/a").unwrap();
        let second = handle.object_info("/b/alias").unwrap();
        assert_eq!(first.address, second.address);
        assert_eq!(first.reference_count, 2);
        assert_eq!(handle.object_info("/b").unwrap().reference_count, 1);
    }

    #[test]
    fn test_open_unknown_path_fails() {
        let store = MemoryStore::new();
        let err = store.open(Path::new("missing.h5")).unwrap_err();
        assert!(matches!(err, StrataError::Open { .. }));
        assert_eq!(store.open_count(), 0);
    }

    #[test]
    fn test_injected_read_failure_is_consumed() {
        let mut c = sample();
        c.fail_reads("/a/x", 1);
        let mut store = MemoryStore::new();
        store.insert("f.h5", c);
        let handle = store.open(Path::new("f.h5")).unwrap();

        assert!(handle.read_dataset("/a/x").is_err());
        assert_eq!(handle.read_dataset("/a/x").unwrap().len(), 8);
        assert_eq!(store.read_count(), 2);
    }

    #[test]
    fn test_duplicate_link_rejected() {
        let mut c = sample();
        assert!(c.add_group("/", "a").is_err());
        assert!(c.add_group("/a/x", "child").is_err());
    }

    #[test]
    fn test_object_count_counts_shared_objects_once() {
        let mut c = sample();
        c.add_attribute("/a/x", "units", ObjectShape::of::<u8>(vec![1]), vec![b'm'])
            .unwrap();
        let a = c.resolve("/a").unwrap();
        c.link("/b", "alias", a).unwrap();
        // a, b, x, units
        assert_eq!(c.object_count(), 4);
    }
}
