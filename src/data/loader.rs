//! Lazy buffer loading.

use super::resolve::{resolve_shape_and_type, ObjectRef};
use super::{Node, NodeKind};
use crate::error::{Result, StrataError};
use crate::store::{join_path, ContainerHandle, ContainerStore, ObjectKind};
use tracing::{debug, info};

/// Read the full contents of a Variable or Attribute node into its buffer.
///
/// Returns immediately when the buffer is already present. Otherwise a fresh
/// handle is opened on the owning file, the shape is resolved again and the
/// whole object is read in one call. On failure the buffer stays unset, so a
/// later call retries. Taking `&mut Node` keeps a node from loading itself
/// twice concurrently.
pub fn ensure_loaded<S: ContainerStore>(store: &S, node: &mut Node) -> Result<()> {
    let kind = node.kind;
    let Some(dataset) = node.dataset.as_mut() else {
        return Err(StrataError::NotADataset {
            path: node.container_path.clone(),
        });
    };
    if dataset.is_loaded() {
        return Ok(());
    }

    let handle = store.open(&node.owning_file)?;
    let path = node.container_path.as_str();
    let (shape, bytes, label) = match kind {
        NodeKind::Variable => {
            let object = ObjectRef::Dataset { path };
            let shape = resolve_shape_and_type(&handle, object)?;
            let bytes = handle
                .read_dataset(path)
                .map_err(|e| into_read_error(path.to_string(), e))?;
            (shape, bytes, path.to_string())
        },
        NodeKind::Attribute => {
            let label = join_path(path, &node.name);
            check_attribute_owner(&handle, path)?;
            let object = ObjectRef::Attribute {
                owner_path: path,
                name: &node.name,
            };
            let shape = resolve_shape_and_type(&handle, object)?;
            let bytes = handle
                .read_attribute(path, &node.name)
                .map_err(|e| into_read_error(label.clone(), e))?;
            (shape, bytes, label)
        },
        NodeKind::Root | NodeKind::Group => {
            return Err(StrataError::NotADataset {
                path: path.to_string(),
            });
        },
    };

    let expected = shape
        .byte_len()
        .ok_or_else(|| StrataError::resolve(label.as_str(), "size overflows"))?;
    if bytes.len() != expected {
        return Err(StrataError::read(
            label,
            format!("expected {} bytes, got {}", expected, bytes.len()),
        ));
    }

    info!("Loaded {} ({} bytes)", label, bytes.len());
    dataset.fill(shape, bytes);
    Ok(())
}

/// Attributes can hang off groups, datasets or named types; anything else
/// cannot own one.
fn check_attribute_owner<H: ContainerHandle>(handle: &H, owner_path: &str) -> Result<()> {
    let owner = handle
        .object_info(owner_path)
        .map_err(|e| StrataError::resolve(owner_path, e))?;
    debug!("Attribute owner {} is a {:?}", owner_path, owner.kind);
    match owner.kind {
        ObjectKind::Group | ObjectKind::Dataset | ObjectKind::NamedType => Ok(()),
        ObjectKind::Unknown => Err(StrataError::resolve(
            owner_path,
            "attribute owner has an unknown kind",
        )),
    }
}

fn into_read_error(path: String, error: StrataError) -> StrataError {
    match error {
        StrataError::Read { .. } => error,
        other => StrataError::read(path, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{encode_native, ObjectShape, TreeReader};
    use crate::store::{MemoryContainer, MemoryStore};
    use std::path::Path;

    fn store_with(container: MemoryContainer) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert("f.h5", container);
        store
    }

    fn sample() -> MemoryContainer {
        let mut c = MemoryContainer::new();
        c.add_dataset(
            "/",
            "x",
            ObjectShape::of::<i16>(vec![3]),
            encode_native(&[1i16, 2, 3]),
        )
        .unwrap();
        c.add_attribute("/x", "scale", ObjectShape::of::<f32>(vec![]), encode_native(&[0.5f32]))
            .unwrap();
        c
    }

    #[test]
    fn test_loads_once() {
        let store = store_with(sample());
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();
        let x = &mut info.root_node.children[0];

        ensure_loaded(&store, x).unwrap();
        ensure_loaded(&store, x).unwrap();
        assert_eq!(store.read_count(), 1);
        assert_eq!(x.dataset.as_ref().unwrap().buffer().unwrap().len(), 6);
    }

    #[test]
    fn test_loads_attribute_through_owner() {
        let store = store_with(sample());
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();
        let scale = &mut info.root_node.children[0].children[0];
        assert!(scale.is_attribute());

        ensure_loaded(&store, scale).unwrap();
        let dataset = scale.dataset.as_ref().unwrap();
        assert_eq!(dataset.buffer().unwrap(), &0.5f32.to_ne_bytes()[..]);
    }

    #[test]
    fn test_read_failure_leaves_buffer_unset_and_retries() {
        let mut c = sample();
        c.fail_reads("/x", 1);
        let store = store_with(c);
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();
        let x = &mut info.root_node.children[0];

        let err = ensure_loaded(&store, x).unwrap_err();
        assert!(matches!(err, StrataError::Read { .. }));
        assert!(!x.dataset.as_ref().unwrap().is_loaded());

        ensure_loaded(&store, x).unwrap();
        assert!(x.dataset.as_ref().unwrap().is_loaded());
        assert_eq!(store.read_count(), 2);
    }

    #[test]
    fn test_attribute_read_failure_retries() {
        let mut c = sample();
        c.fail_attribute_reads("/x", "scale", 1);
        let store = store_with(c);
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();
        let scale = &mut info.root_node.children[0].children[0];

        let err = ensure_loaded(&store, scale).unwrap_err();
        assert!(matches!(err, StrataError::Read { .. }));
        assert!(!scale.dataset.as_ref().unwrap().is_loaded());

        ensure_loaded(&store, scale).unwrap();
        let dataset = scale.dataset.as_ref().unwrap();
        assert_eq!(dataset.buffer().unwrap(), &0.5f32.to_ne_bytes()[..]);
        assert_eq!(store.read_count(), 2);

        // the owner was never read
        let x = &info.root_node.children[0];
        assert!(!x.dataset.as_ref().unwrap().is_loaded());
    }

    #[test]
    fn test_attribute_shape_failure_is_resolve_error() {
        let mut c = sample();
        c.fail_attribute_shape("/x", "scale");
        let store = store_with(c);
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();
        assert_eq!(info.diagnostics.len(), 1);
        let scale = &mut info.root_node.children[0].children[0];

        let err = ensure_loaded(&store, scale).unwrap_err();
        assert!(matches!(err, StrataError::Resolve { .. }));
        assert!(!scale.dataset.as_ref().unwrap().is_loaded());
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_groups_have_nothing_to_load() {
        let mut c = MemoryContainer::new();
        c.add_group("/", "g").unwrap();
        let store = store_with(c);
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();

        let err = ensure_loaded(&store, &mut info.root_node.children[0]).unwrap_err();
        assert!(matches!(err, StrataError::NotADataset { .. }));
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_size_mismatch_is_read_failure() {
        let mut c = MemoryContainer::new();
        c.add_dataset("/", "short", ObjectShape::of::<i32>(vec![4]), vec![0; 3])
            .unwrap();
        let store = store_with(c);
        let mut info = TreeReader::read_file(&store, Path::new("f.h5")).unwrap();
        let node = &mut info.root_node.children[0];

        assert!(matches!(
            ensure_loaded(&store, node),
            Err(StrataError::Read { .. })
        ));
        assert!(!node.dataset.as_ref().unwrap().is_loaded());
    }
}
