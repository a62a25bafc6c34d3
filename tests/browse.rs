//! End-to-end browsing over in-memory containers.

use std::path::Path;
use strata::data::{
    encode_native, ensure_loaded, ContainerInfo, DatatypeClass, ElementType, Node, NodeKind,
    ObjectShape, TreeReader,
};
use strata::grid::{grid_shape, GridView, UNSUPPORTED_MARKER};
use strata::store::{MemoryContainer, MemoryStore};
use strata::util::find_node_mut;
use strata::StrataError;

fn store_with(name: &str, container: MemoryContainer) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert(name, container);
    store
}

fn scenario() -> MemoryContainer {
    let mut c = MemoryContainer::new();
    c.add_group("/", "group_a").unwrap();
    let values: Vec<i32> = (0..12).collect();
    c.add_dataset(
        "/group_a",
        "dataset_x",
        ObjectShape::of::<i32>(vec![3, 4]),
        encode_native(&values),
    )
    .unwrap();
    c.add_attribute(
        "/group_a/dataset_x",
        "units",
        ObjectShape::scalar(ElementType::of_class(DatatypeClass::String, 1)),
        b"m".to_vec(),
    )
    .unwrap();
    c
}

fn count_nodes(node: &Node) -> usize {
    node.children.iter().map(|c| 1 + count_nodes(c)).sum()
}

#[test]
fn test_end_to_end_scenario() {
    let store = store_with("scenario.h5", scenario());
    let mut info = TreeReader::read_file(&store, Path::new("scenario.h5")).unwrap();
    assert!(info.diagnostics.is_empty());

    let root = &info.root_node;
    assert_eq!(root.kind, NodeKind::Root);
    let group = &root.children[0];
    assert_eq!((group.kind, group.name.as_str()), (NodeKind::Group, "group_a"));
    let variable = &group.children[0];
    assert_eq!(
        (variable.kind, variable.name.as_str()),
        (NodeKind::Variable, "dataset_x")
    );
    let attribute = &variable.children[0];
    assert_eq!((attribute.kind, attribute.name.as_str()), (NodeKind::Attribute, "units"));

    // nothing read until a node is viewed
    assert_eq!(store.read_count(), 0);

    let node = info.root_node.find_variable_mut("/group_a/dataset_x").unwrap();
    ensure_loaded(&store, node).unwrap();
    let dataset = node.dataset.as_ref().unwrap();
    assert_eq!(grid_shape(&dataset.dims), (3, 4));
    let view = GridView::for_dataset(dataset);
    assert_eq!(view.cell_text(dataset, 2, 3), "11");
    assert_eq!(view.cell_text(dataset, 0, 0), "0");

    let units = find_node_mut(&mut info.root_node, "/group_a/dataset_x/units").unwrap();
    assert!(units.is_attribute());
    let dataset = units.dataset.as_ref().unwrap();
    let view = GridView::for_dataset(dataset);
    assert_eq!(view.cell_text(dataset, 0, 0), UNSUPPORTED_MARKER);
}

#[test]
fn test_every_object_appears_once_without_shared_links() {
    let mut c = scenario();
    c.add_group("/group_a", "nested").unwrap();
    c.add_dataset("/group_a/nested", "v", ObjectShape::of::<f64>(vec![2]), encode_native(&[0.5f64, 1.5]))
        .unwrap();
    c.add_attribute("/", "title", ObjectShape::of::<u8>(vec![3]), b"abc".to_vec())
        .unwrap();
    c.add_named_type("/group_a", "t").unwrap();
    let expected = c.object_count();

    let store = store_with("tree.h5", c);
    let info = TreeReader::read_file(&store, Path::new("tree.h5")).unwrap();
    assert_eq!(count_nodes(&info.root_node), expected);
    assert_eq!(info.object_count(), expected);
}

#[test]
fn test_group_with_two_links_is_descended_once() {
    let mut c = MemoryContainer::new();
    let shared = c.add_group("/", "first").unwrap();
    c.add_dataset("/first", "d", ObjectShape::of::<u8>(vec![1]), vec![7])
        .unwrap();
    c.link("/", "second", shared).unwrap();

    let store = store_with("shared.h5", c);
    let info = TreeReader::read_file(&store, Path::new("shared.h5")).unwrap();
    let root = &info.root_node;
    assert_eq!(root.children.len(), 2);
    let descended: Vec<&Node> = root.children.iter().filter(|g| !g.children.is_empty()).collect();
    assert_eq!(descended.len(), 1);
    assert_eq!(descended[0].name, "first");
}

#[test]
fn test_cycle_back_to_root_terminates() {
    let mut c = MemoryContainer::new();
    c.add_group("/", "g").unwrap();
    c.link("/g", "up", strata::store::ObjectId::ROOT).unwrap();

    let store = store_with("cycle.h5", c);
    let info = TreeReader::read_file(&store, Path::new("cycle.h5")).unwrap();
    let g = &info.root_node.children[0];
    assert_eq!(g.children[0].name, "up");
    assert!(g.children[0].children.is_empty());
}

#[test]
fn test_load_is_idempotent() {
    let store = store_with("scenario.h5", scenario());
    let mut info = TreeReader::read_file(&store, Path::new("scenario.h5")).unwrap();
    let node = info.root_node.find_variable_mut("/group_a/dataset_x").unwrap();

    ensure_loaded(&store, node).unwrap();
    let first = node.dataset.as_ref().unwrap().buffer().unwrap().to_vec();
    ensure_loaded(&store, node).unwrap();
    assert_eq!(node.dataset.as_ref().unwrap().buffer().unwrap(), first.as_slice());
    assert_eq!(store.read_count(), 1);
}

#[test]
fn test_failed_read_can_be_retried() {
    let mut c = scenario();
    c.fail_reads("/group_a/dataset_x", 1);
    let store = store_with("flaky.h5", c);
    let mut info = TreeReader::read_file(&store, Path::new("flaky.h5")).unwrap();
    let node = info.root_node.find_variable_mut("/group_a/dataset_x").unwrap();

    let err = ensure_loaded(&store, node).unwrap_err();
    assert!(matches!(err, StrataError::Read { .. }));
    let dataset = node.dataset.as_ref().unwrap();
    assert!(!dataset.is_loaded());
    assert_eq!(GridView::for_dataset(dataset).cell_text(dataset, 0, 0), "");

    ensure_loaded(&store, node).unwrap();
    let dataset = node.dataset.as_ref().unwrap();
    assert_eq!(GridView::for_dataset(dataset).cell_text(dataset, 1, 1), "5");
}

#[test]
fn test_rank6_offsets_match_mixed_radix() {
    let dims = vec![2, 3, 2, 2, 3, 4];
    let total: usize = dims.iter().product();
    let values: Vec<u16> = (0..total as u16).collect();

    let mut c = MemoryContainer::new();
    c.add_dataset("/", "hyper", ObjectShape::of::<u16>(dims.clone()), encode_native(&values))
        .unwrap();
    let store = store_with("hyper.h5", c);
    let mut info: ContainerInfo = TreeReader::read_file(&store, Path::new("hyper.h5")).unwrap();
    let node = info.root_node.find_variable_mut("/hyper").unwrap();
    ensure_loaded(&store, node).unwrap();
    let dataset = node.dataset.as_ref().unwrap();

    let mut view = GridView::for_dataset(dataset);
    assert_eq!(view.layer_count(), 4);
    assert_eq!(view.shape(), (3, 4));
    for (dim, index) in [(0, 1), (1, 2), (2, 1), (3, 0)] {
        view.set_layer(dim, index);
    }
    // ((((1*3 + 2)*2 + 1)*2 + 0) * 3*4) + 2*4 + 3
    let expected = (((3 + 2) * 2 + 1) * 2) * 12 + 2 * 4 + 3;
    assert_eq!(view.flat_index(2, 3), Some(expected));
    assert_eq!(view.cell_text(dataset, 2, 3), expected.to_string());
    assert_eq!(view.flat_index(3, 0), None);
}
