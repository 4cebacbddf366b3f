//! Fixture trees shared across the crate's tests.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::PathBuf;

use crate::core::fs::{Layer, LayerEntry, LayerStack, WalkConfig};
use crate::core::tree::{FileTree, NodeId};

/// ```text
/// /
/// ├── a/        (collapsed)
/// │   ├── a1
/// │   └── a2
/// └── b
/// ```
pub fn scenario_tree() -> FileTree {
    let mut tree = FileTree::new("/");
    let root = tree.root;
    let a = tree.add_child(root, "a", true, 0);
    tree.add_child(a, "a1", false, 10);
    tree.add_child(a, "a2", false, 20);
    tree.add_child(root, "b", false, 30);
    tree.nodes[a].collapsed = true;
    tree
}

/// ```text
/// /
/// ├── a/
/// │   ├── a1
/// │   └── a2
/// ├── b/
/// │   └── b1/
/// │       └── b1x
/// └── c
/// ```
pub fn nested_tree() -> FileTree {
    let mut tree = FileTree::new("/");
    let root = tree.root;
    let a = tree.add_child(root, "a", true, 0);
    tree.add_child(a, "a1", false, 1);
    tree.add_child(a, "a2", false, 2);
    let b = tree.add_child(root, "b", true, 0);
    let b1 = tree.add_child(b, "b1", true, 0);
    tree.add_child(b1, "b1x", false, 3);
    tree.add_child(root, "c", false, 4);
    tree
}

/// A root holding `count` files and nothing else.
pub fn wide_tree(count: usize) -> FileTree {
    let mut tree = FileTree::new("/");
    let root = tree.root;
    for i in 0..count {
        tree.add_child(root, &format!("file{i:02}"), false, i as u64);
    }
    tree
}

fn entry(path: &str, is_dir: bool, size: u64) -> LayerEntry {
    LayerEntry {
        path: PathBuf::from(path),
        is_dir,
        size,
    }
}

/// Two layers: `base` with `etc/{hosts,motd}` and `usr/app`, then `update`
/// which rewrites `etc/hosts`, whites out `etc/motd` and adds `var/log`.
pub fn layer_stack() -> LayerStack {
    let base = Layer {
        root: PathBuf::from("base"),
        entries: vec![
            entry("etc", true, 0),
            entry("etc/hosts", false, 10),
            entry("etc/motd", false, 5),
            entry("usr", true, 0),
            entry("usr/app", false, 100),
        ],
    };
    let update = Layer {
        root: PathBuf::from("update"),
        entries: vec![
            entry("etc", true, 0),
            entry("etc/.wh.motd", false, 0),
            entry("etc/hosts", false, 12),
            entry("var", true, 0),
            entry("var/log", false, 7),
        ],
    };
    LayerStack::from_layers(vec![base, update], WalkConfig::default())
}

/// Names of the given nodes, in order.
pub fn names(tree: &FileTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree.nodes[id].name.clone()).collect()
}
