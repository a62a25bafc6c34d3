//! Shape and datatype resolution for datasets and attributes.

use super::datatype::{ObjectShape, MAX_SUPPORTED_RANK};
use crate::error::{Result, StrataError};
use crate::store::{join_path, ContainerHandle};

/// Reference to an object carrying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef<'a> {
    /// Dataset at a container path.
    Dataset {
        /// Path of the dataset.
        path: &'a str,
    },
    /// Attribute on the object at `owner_path`.
    Attribute {
        /// Path of the owning object.
        owner_path: &'a str,
        /// Attribute name.
        name: &'a str,
    },
}

impl ObjectRef<'_> {
    /// Path used in messages; `owner/name` for attributes.
    pub fn display_path(&self) -> String {
        match self {
            ObjectRef::Dataset { path } => path.to_string(),
            ObjectRef::Attribute { owner_path, name } => join_path(owner_path, name),
        }
    }
}

/// Determine dims (outermost first) and the native element type of `object`.
///
/// Fails with a `Resolve` error when the store cannot describe the object, when
/// the rank exceeds [`MAX_SUPPORTED_RANK`], or when the total size overflows.
pub fn resolve_shape_and_type<H: ContainerHandle>(
    handle: &H,
    object: ObjectRef<'_>,
) -> Result<ObjectShape> {
    let shape = match object {
        ObjectRef::Dataset { path } => handle.dataset_shape_type(path),
        ObjectRef::Attribute { owner_path, name } => handle.attribute_shape_type(owner_path, name),
    }
    .map_err(|e| match e {
        StrataError::Resolve { .. } => e,
        other => StrataError::resolve(object.display_path(), other),
    })?;

    if shape.dims.len() > MAX_SUPPORTED_RANK {
        return Err(StrataError::resolve(
            object.display_path(),
            format!(
                "rank {} exceeds the maximum of {}",
                shape.dims.len(),
                MAX_SUPPORTED_RANK
            ),
        ));
    }
    if shape.byte_len().is_none() {
        return Err(StrataError::resolve(
            object.display_path(),
            format!("size of {:?} x {} bytes overflows", shape.dims, shape.datatype.size),
        ));
    }
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encode_native;
    use crate::store::{ContainerStore, MemoryContainer, MemoryHandle, MemoryStore};
    use std::path::Path;

    fn open(container: MemoryContainer) -> MemoryHandle {
        let mut store = MemoryStore::new();
        store.insert("f.h5", container);
        store.open(Path::new("f.h5")).unwrap()
    }

    #[test]
    fn test_resolves_dataset_and_attribute() {
        let mut c = MemoryContainer::new();
        c.add_dataset("/", "x", ObjectShape::of::<f32>(vec![2, 3]), encode_native(&[0f32; 6]))
            .unwrap();
        c.add_attribute("/x", "scale", ObjectShape::of::<f64>(vec![]), encode_native(&[2.0f64]))
            .unwrap();
        let handle = open(c);

        let shape = resolve_shape_and_type(&handle, ObjectRef::Dataset { path: "/x" }).unwrap();
        assert_eq!(shape, ObjectShape::of::<f32>(vec![2, 3]));

        let attr = resolve_shape_and_type(
            &handle,
            ObjectRef::Attribute {
                owner_path: "/x",
                name: "scale",
            },
        )
        .unwrap();
        assert!(attr.dims.is_empty());
    }

    #[test]
    fn test_rank_ceiling() {
        let mut c = MemoryContainer::new();
        c.add_dataset(
            "/",
            "deep",
            ObjectShape::of::<u8>(vec![1; MAX_SUPPORTED_RANK + 1]),
            vec![0],
        )
        .unwrap();
        c.add_dataset(
            "/",
            "max",
            ObjectShape::of::<u8>(vec![1; MAX_SUPPORTED_RANK]),
            vec![0],
        )
        .unwrap();
        let handle = open(c);

        let err = resolve_shape_and_type(&handle, ObjectRef::Dataset { path: "/deep" }).unwrap_err();
        assert!(matches!(err, StrataError::Resolve { .. }));
        assert!(resolve_shape_and_type(&handle, ObjectRef::Dataset { path: "/max" }).is_ok());
    }

    #[test]
    fn test_missing_object_is_resolve_failure() {
        let handle = open(MemoryContainer::new());
        let err = resolve_shape_and_type(&handle, ObjectRef::Dataset { path: "/nope" }).unwrap_err();
        assert!(matches!(err, StrataError::Resolve { .. }));
    }
}
