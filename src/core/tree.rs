//! In-memory file tree for one layer of a layer stack.
//!
//! Nodes live in an arena (the [`FileTree`] struct) and refer to each other by
//! index.  The parent link is an index too, so it can be followed upward but
//! never keeps anything alive.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use super::fs::LayerStack;
use super::model::{TreeError, TreeModel};
use super::traversal;

// ───────────────────────────────────────── diff kind ─────────

/// How a path changed in the current layer relative to the layers below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiffType {
    Added,
    Removed,
    Modified,
    #[default]
    Unmodified,
}

impl DiffType {
    /// Single-character marker used in the attribute column.
    pub fn marker(self) -> char {
        match self {
            DiffType::Added => '+',
            DiffType::Removed => '-',
            DiffType::Modified => '~',
            DiffType::Unmodified => ' ',
        }
    }
}

// ───────────────────────────────────────── tree node ─────────

/// Index into [`FileTree::nodes`].
pub type NodeId = usize;

/// A single node in the arena-allocated tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub name: String,
    /// Absolute path inside the layer, e.g. `/etc/hosts`.  The root is `/`.
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    pub diff: DiffType,
    /// Only meaningful for directories.
    pub collapsed: bool,
    /// Set by the diff-kind filter.
    pub hidden: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

// ───────────────────────────────────────── arena tree ────────

/// Arena-backed file tree, optionally bound to a [`LayerStack`] so it can be
/// rebuilt for another layer.
#[derive(Debug, Clone)]
pub struct FileTree {
    pub nodes: Vec<FileNode>,
    pub root: NodeId,
    hidden_kinds: HashSet<DiffType>,
    layers: Option<LayerStack>,
    layer_index: Option<usize>,
}

impl FileTree {
    /// Create a tree holding only an (expanded) root directory.
    pub fn new(root_name: &str) -> Self {
        let root = FileNode {
            name: root_name.to_string(),
            path: PathBuf::from("/"),
            is_dir: true,
            size: 0,
            diff: DiffType::Unmodified,
            collapsed: false,
            hidden: false,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: 0,
            hidden_kinds: HashSet::new(),
            layers: None,
            layer_index: None,
        }
    }

    /// Build the tree for layer `index` and keep the stack for later switches.
    pub fn from_layers(layers: LayerStack, index: usize) -> Result<Self, TreeError> {
        let mut tree = layers.build(index)?;
        tree.layers = Some(layers);
        tree.layer_index = Some(index);
        Ok(tree)
    }

    /// Append a child under `parent_id` and return its [`NodeId`].
    pub fn add_child(&mut self, parent_id: NodeId, name: &str, is_dir: bool, size: u64) -> NodeId {
        let path = self.nodes[parent_id].path.join(name);
        let id = self.nodes.len();
        self.nodes.push(FileNode {
            name: name.to_string(),
            path,
            is_dir,
            size,
            diff: DiffType::Unmodified,
            collapsed: false,
            hidden: false,
            parent: Some(parent_id),
            children: Vec::new(),
        });
        self.nodes[parent_id].children.push(id);
        id
    }

    /// Insert or update the entry at `path`, creating missing parent
    /// directories.  Children are kept sorted: directories first, then
    /// files, each alphabetically (case-insensitive).
    pub fn upsert(&mut self, path: &Path, is_dir: bool, size: u64) -> NodeId {
        let names: Vec<String> = path_names(path).collect();
        let mut current = self.root;
        for (depth, name) in names.iter().enumerate() {
            let last = depth + 1 == names.len();
            current = match self.child_named(current, name) {
                Some(id) => id,
                None => self.insert_sorted(current, name, !last || is_dir),
            };
        }
        if current != self.root {
            let node = &mut self.nodes[current];
            node.is_dir = is_dir;
            node.size = if is_dir { 0 } else { size };
            if !is_dir {
                node.children.clear();
            }
        }
        current
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&id| self.nodes[id].name == name)
    }

    fn insert_sorted(&mut self, parent: NodeId, name: &str, is_dir: bool) -> NodeId {
        let id = self.add_child(parent, name, is_dir, 0);
        let mut siblings = std::mem::take(&mut self.nodes[parent].children);
        siblings.sort_by_cached_key(|&sid| {
            let node = &self.nodes[sid];
            (!node.is_dir, node.name.to_lowercase())
        });
        self.nodes[parent].children = siblings;
        id
    }

    /// Find the node at an absolute in-layer path.
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        path_names(path).try_fold(self.root, |current, name| self.child_named(current, &name))
    }

    /// Index of the layer this tree shows, when it was built from a stack.
    pub fn layer_index(&self) -> Option<usize> {
        self.layer_index
    }

    pub fn layer_count(&self) -> usize {
        self.layers.as_ref().map_or(0, LayerStack::len)
    }

    /// Directory backing the current layer.
    pub fn layer_root(&self) -> Option<&Path> {
        let index = self.layer_index?;
        self.layers.as_ref()?.root(index)
    }

    fn apply_hidden_kinds(&mut self) {
        let root = self.root;
        for (id, node) in self.nodes.iter_mut().enumerate() {
            node.hidden = id != root && self.hidden_kinds.contains(&node.diff);
        }
    }

    // ── line formatting ─────────────────────────────────────────

    fn format_line(&self, id: NodeId, show_attributes: bool) -> String {
        let node = &self.nodes[id];
        let mut line = String::new();

        if show_attributes {
            let size = if node.is_dir {
                "-".to_string()
            } else {
                human_size(node.size)
            };
            line.push_str(&format!("{} {size:>10}  ", node.diff.marker()));
        }

        if node.parent.is_some() {
            let mut guides = Vec::new();
            let mut current = node.parent;
            while let Some(ancestor) = current {
                if self.nodes[ancestor].parent.is_none() {
                    break;
                }
                guides.push(if self.is_last_visible(ancestor) {
                    "    "
                } else {
                    "│   "
                });
                current = self.nodes[ancestor].parent;
            }
            for guide in guides.iter().rev() {
                line.push_str(guide);
            }
            line.push_str(if self.is_last_visible(id) {
                "└── "
            } else {
                "├── "
            });
        }

        if node.is_dir {
            line.push_str(if node.collapsed { "▶ " } else { "▼ " });
        }
        line.push_str(&node.name);
        line
    }

    fn is_last_visible(&self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id].parent else {
            return true;
        };
        let siblings = &self.nodes[parent].children;
        siblings
            .iter()
            .skip_while(|&&sid| sid != id)
            .skip(1)
            .all(|&sid| self.nodes.get(sid).is_none_or(|n| n.hidden))
    }
}

impl TreeModel for FileTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Result<&FileNode, TreeError> {
        self.nodes.get(id).ok_or(TreeError::UnknownNode(id))
    }

    fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::UnknownNode(id))?;
        node.collapsed = collapsed;
        Ok(())
    }

    fn string_between(&self, lower: usize, upper: usize, show_attributes: bool) -> String {
        let mut lines = Vec::new();
        for (index, visit) in traversal::parent_first(self, traversal::is_visible).enumerate() {
            if index >= upper {
                break;
            }
            let visit = match visit {
                Ok(visit) => visit,
                Err(err) => {
                    tracing::warn!("unable to format tree window: {err}");
                    break;
                }
            };
            if index >= lower {
                lines.push(self.format_line(visit.id, show_attributes));
            }
        }
        lines.join("\n")
    }

    fn remove_path(&mut self, path: &Path) -> Result<(), TreeError> {
        let id = self
            .find(path)
            .ok_or_else(|| TreeError::PathNotFound(path.to_path_buf()))?;
        let parent = self.nodes[id].parent.ok_or(TreeError::RemoveRoot)?;
        self.nodes[parent].children.retain(|&child| child != id);
        Ok(())
    }

    fn visible_size(&self) -> usize {
        traversal::visible_count(self).unwrap_or_else(|err| {
            tracing::warn!("unable to count visible nodes: {err}");
            0
        })
    }

    fn set_layer_index(&mut self, index: usize) -> bool {
        let Some(layers) = self.layers.as_ref() else {
            return false;
        };
        if index >= layers.len() || self.layer_index == Some(index) {
            return false;
        }
        let mut rebuilt = match layers.build(index) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::warn!(index, "unable to build layer: {err}");
                return false;
            }
        };

        let collapsed: HashMap<&Path, bool> = self
            .nodes
            .iter()
            .filter(|n| n.is_dir)
            .map(|n| (n.path.as_path(), n.collapsed))
            .collect();
        for node in rebuilt.nodes.iter_mut() {
            if let Some(&state) = collapsed.get(node.path.as_path()) {
                node.collapsed = state;
            }
        }

        self.nodes = rebuilt.nodes;
        self.root = rebuilt.root;
        self.layer_index = Some(index);
        self.apply_hidden_kinds();
        tracing::debug!(index, nodes = self.nodes.len(), "switched layer");
        true
    }

    fn toggle_hidden_file_type(&mut self, kind: DiffType) -> bool {
        if !self.hidden_kinds.remove(&kind) {
            self.hidden_kinds.insert(kind);
        }
        self.apply_hidden_kinds();
        true
    }
}

/// Normal components of an in-layer path, as owned strings.
fn path_names(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Format a byte count in binary units.
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    for &unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PiB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{names, nested_tree, scenario_tree};

    #[test]
    fn upsert_creates_parents_and_sorts_dirs_first() {
        let mut tree = FileTree::new("/");
        tree.upsert(Path::new("zeta.txt"), false, 3);
        tree.upsert(Path::new("beta/inner.txt"), false, 1);
        tree.upsert(Path::new("Alpha.txt"), false, 2);

        let root_children = tree.nodes[tree.root].children.clone();
        assert_eq!(names(&tree, &root_children), ["beta", "Alpha.txt", "zeta.txt"]);

        let inner = tree.find(Path::new("/beta/inner.txt")).unwrap();
        assert_eq!(tree.nodes[inner].size, 1);
        assert!(tree.nodes[tree.nodes[inner].parent.unwrap()].is_dir);
    }

    #[test]
    fn collapsing_removes_exactly_the_visible_descendants() {
        let mut tree = nested_tree();
        let before = tree.visible_size();
        let b = tree.find(Path::new("/b")).unwrap();

        tree.set_collapsed(b, true).unwrap();
        assert_eq!(tree.visible_size(), before - 2);

        tree.set_collapsed(b, false).unwrap();
        assert_eq!(tree.visible_size(), before);
    }

    #[test]
    fn string_between_renders_guides_and_markers() {
        let tree = nested_tree();
        let text = tree.string_between(0, 100, false);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "▼ /",
                "├── ▼ a",
                "│   ├── a1",
                "│   └── a2",
                "├── ▼ b",
                "│   └── ▼ b1",
                "│       └── b1x",
                "└── c",
            ]
        );
    }

    #[test]
    fn string_between_returns_only_the_window() {
        let tree = nested_tree();
        let text = tree.string_between(2, 4, false);
        assert_eq!(text, "│   ├── a1\n│   └── a2");
        assert_eq!(tree.string_between(8, 10, false), "");
    }

    #[test]
    fn attribute_column_shows_diff_marker_and_size() {
        let mut tree = scenario_tree();
        let b = tree.find(Path::new("/b")).unwrap();
        tree.nodes[b].diff = DiffType::Added;
        tree.nodes[b].size = 2048;

        let text = tree.string_between(2, 3, true);
        assert_eq!(text, format!("+ {:>10}  └── b", "2.0 KiB"));
    }

    #[test]
    fn hidden_sibling_moves_the_last_guide() {
        let mut tree = nested_tree();
        let c = tree.find(Path::new("/c")).unwrap();
        tree.nodes[c].diff = DiffType::Removed;
        tree.toggle_hidden_file_type(DiffType::Removed);

        let text = tree.string_between(4, 5, false);
        assert_eq!(text, "└── ▼ b");
    }

    #[test]
    fn toggling_a_kind_twice_restores_visibility() {
        let mut tree = nested_tree();
        let a1 = tree.find(Path::new("/a/a1")).unwrap();
        tree.nodes[a1].diff = DiffType::Modified;

        assert!(tree.toggle_hidden_file_type(DiffType::Modified));
        assert!(tree.nodes[a1].hidden);
        assert_eq!(tree.visible_size(), 6);

        tree.toggle_hidden_file_type(DiffType::Modified);
        assert!(!tree.nodes[a1].hidden);
        assert_eq!(tree.visible_size(), 7);
    }

    #[test]
    fn root_is_never_hidden() {
        let mut tree = nested_tree();
        tree.toggle_hidden_file_type(DiffType::Unmodified);
        assert!(!tree.nodes[tree.root].hidden);
        assert_eq!(tree.visible_size(), 0);
    }

    #[test]
    fn remove_path_detaches_the_subtree() {
        let mut tree = nested_tree();
        tree.remove_path(Path::new("/b")).unwrap();
        assert_eq!(tree.find(Path::new("/b/b1")), None);
        assert_eq!(tree.visible_size(), 4);

        assert!(matches!(
            tree.remove_path(Path::new("/b")),
            Err(TreeError::PathNotFound(_))
        ));
        assert!(matches!(
            tree.remove_path(Path::new("/")),
            Err(TreeError::RemoveRoot)
        ));
    }

    #[test]
    fn hand_built_tree_has_no_layers_to_switch() {
        let mut tree = nested_tree();
        assert!(!tree.set_layer_index(0));
        assert_eq!(tree.layer_count(), 0);
    }

    #[test]
    fn human_size_uses_binary_units() {
        assert_eq!(human_size(12), "12.0 B");
        assert_eq!(human_size(1536), "1.5 KiB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
