//! Container data reading and representation.
//!
//! This module reads a container's structure into a tree of nodes, resolves
//! dataset and attribute shapes, and loads their raw buffers on demand.

mod container;
mod datatype;
mod loader;
mod node;
mod reader;
mod registry;
mod resolve;

pub use container::{ContainerInfo, Diagnostic};
pub use datatype::{
    element_count, encode_native, DatatypeClass, ElementType, NativeElement, ObjectShape, Sign,
    MAX_SUPPORTED_RANK,
};
pub use loader::ensure_loaded;
pub use node::{Dataset, Node, NodeKind};
pub use reader::TreeReader;
pub use registry::ObjectRegistry;
pub use resolve::{resolve_shape_and_type, ObjectRef};
