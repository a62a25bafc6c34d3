//! Text output helpers shared by the CLI modes and the browser.

use crate::data::{ContainerInfo, Dataset, Node, NodeKind};
use crate::grid::GridView;
use crate::store::join_path;

/// Render the whole tree of one container, one node per line.
pub fn format_tree(container: &ContainerInfo) -> String {
    let mut text = format_tree_recursive(&container.root_node, "", true);
    for diagnostic in &container.diagnostics {
        text.push_str(&format!("! {}\n", diagnostic));
    }
    text
}

fn format_tree_recursive(node: &Node, prefix: &str, is_last: bool) -> String {
    let mut result = String::new();

    let connector = if is_last { "└── " } else { "├── " };
    result.push_str(&format!("{}{}{}\n", prefix, connector, node.display_name()));

    let new_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "│" });

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        result.push_str(&format_tree_recursive(child, &new_prefix, is_last_child));
    }

    result
}

/// Path under which a node can be looked up: the container path for groups and
/// variables, `owner/name` for attributes.
pub fn node_path(node: &Node) -> String {
    match node.kind {
        NodeKind::Attribute => join_path(&node.container_path, &node.name),
        _ => node.container_path.clone(),
    }
}

/// Find a node by [`node_path`]. Child nodes are searched before attributes
/// with the same path.
pub fn find_node_mut<'a>(node: &'a mut Node, path: &str) -> Option<&'a mut Node> {
    if node_path(node) == path {
        return Some(node);
    }
    node.children
        .iter_mut()
        .find_map(|child| find_node_mut(child, path))
}

/// Tab-separated text of the current layer of a loaded dataset.
pub fn format_grid_tsv(view: &GridView, dataset: &Dataset) -> String {
    let (rows, cols) = view.shape();
    view.materialize(dataset, 0, rows, 0, cols)
        .into_iter()
        .map(|row| row.join("\t") + "\n")
        .collect()
}

/// Multi-line description of one node for the details panel.
pub fn format_node_info(node: &Node) -> Vec<(&'static str, String)> {
    let mut info = vec![
        ("Name", node.name.clone()),
        ("Kind", node.kind.name().to_string()),
        ("Path", node_path(node)),
        ("File", node.owning_file.display().to_string()),
    ];

    if let Some(dataset) = &node.dataset {
        let dims = if dataset.dims.is_empty() {
            "scalar".to_string()
        } else {
            format!("{:?}", dataset.dims)
        };
        info.push(("Dims", dims));
        info.push(("Class", dataset.datatype_class().to_string()));
        info.push(("Element size", format!("{} bytes", dataset.element_size())));
        info.push(("Sign", format!("{:?}", dataset.sign())));
        if let Some(count) = dataset.element_count() {
            info.push(("Elements", count.to_string()));
        }
        info.push((
            "Grid view",
            if dataset.is_numeric() { "available" } else { "unavailable" }.to_string(),
        ));
        info.push(("Loaded", dataset.is_loaded().to_string()));
    } else {
        info.push(("Children", node.children.len().to_string()));
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{encode_native, ObjectShape};
    use std::path::{Path, PathBuf};

    fn sample() -> ContainerInfo {
        let file = Path::new("f.h5");
        let mut root = Node::new(NodeKind::Root, "f.h5", "/", file);
        let mut group = Node::new(NodeKind::Group, "g", "/g", file);
        let mut x = Node::with_dataset(
            NodeKind::Variable,
            "x",
            file,
            Dataset::new("/g/x", ObjectShape::of::<i32>(vec![2, 2])),
        );
        x.add_child(Node::with_dataset(
            NodeKind::Attribute,
            "units",
            file,
            Dataset::new("/g/x", ObjectShape::of::<u8>(vec![1])),
        ));
        group.add_child(x);
        root.add_child(group);
        ContainerInfo::new(PathBuf::from("f.h5"), root, Vec::new())
    }

    #[test]
    fn test_format_tree() {
        let text = format_tree(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("└── 🏠 f.h5"));
        assert!(lines[2].contains("🧮 x [2, 2] int32"));
        assert!(lines[3].contains("units"));
    }

    #[test]
    fn test_find_node() {
        let mut container = sample();
        let root = &mut container.root_node;
        assert_eq!(find_node_mut(root, "/g/x").unwrap().kind, NodeKind::Variable);
        assert_eq!(
            find_node_mut(root, "/g/x/units").unwrap().kind,
            NodeKind::Attribute
        );
        assert!(find_node_mut(root, "/g/y").is_none());
    }

    #[test]
    fn test_grid_tsv() {
        let mut dataset = Dataset::new("/x", ObjectShape::of::<i32>(vec![2, 2]));
        dataset.fill(
            ObjectShape::of::<i32>(vec![2, 2]),
            encode_native(&[1i32, 2, 3, 4]),
        );
        let view = GridView::for_dataset(&dataset);
        assert_eq!(format_grid_tsv(&view, &dataset), "1\t2\n3\t4\n");
    }
}
