//! Layer stack: a list of directories stacked like image layers.
//!
//! Each directory is walked once with the [`ignore`] crate.  The tree for
//! layer `i` is the overlay of layers `0..=i`, diffed against the overlay of
//! layers `0..i`.  A file named `.wh.<name>` whites out `<name>` from the
//! layers below it.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::model::{TreeError, TreeModel};
use super::traversal;
use super::tree::{DiffType, FileTree};

const WHITEOUT_PREFIX: &str = ".wh.";

/// Configuration knobs for the traversal.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Respect `.gitignore` files.
    pub respect_gitignore: bool,
    /// Show hidden (dot-prefixed) entries.  Whiteout markers are always read.
    pub show_hidden: bool,
    /// Start every directory collapsed.
    pub collapse_dirs: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            show_hidden: false,
            collapse_dirs: false,
        }
    }
}

/// One entry found while walking a layer directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    /// Path relative to the layer root.
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
}

impl LayerEntry {
    /// The path this entry whites out, if it is a whiteout marker.
    fn whiteout_target(&self) -> Option<PathBuf> {
        let name = self.path.file_name()?.to_str()?;
        let target = name.strip_prefix(WHITEOUT_PREFIX)?;
        Some(self.path.with_file_name(target))
    }
}

/// The scanned contents of one layer directory.
#[derive(Debug, Clone)]
pub struct Layer {
    pub root: PathBuf,
    pub entries: Vec<LayerEntry>,
}

/// All layers, scanned up front.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: Vec<Layer>,
    config: WalkConfig,
}

impl LayerStack {
    /// Walk every layer directory.
    pub fn scan(roots: &[PathBuf], config: WalkConfig) -> Result<Self, TreeError> {
        let layers = roots
            .iter()
            .map(|root| scan_layer(root, &config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_layers(layers, config))
    }

    /// Build a stack from already-scanned layers.
    pub fn from_layers(layers: Vec<Layer>, config: WalkConfig) -> Self {
        Self { layers, config }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn root(&self, index: usize) -> Option<&Path> {
        self.layers.get(index).map(|l| l.root.as_path())
    }

    /// Build the diff tree for layer `index`.
    pub fn build(&self, index: usize) -> Result<FileTree, TreeError> {
        let lower = overlay(&self.layers[..index.min(self.layers.len())]);
        let upper = overlay(&self.layers[..(index + 1).min(self.layers.len())]);
        let mut tree = diff_trees(&lower, upper)?;

        if self.config.collapse_dirs {
            for node in tree.nodes.iter_mut().filter(|n| n.is_dir && n.parent.is_some()) {
                node.collapsed = true;
            }
        }
        Ok(tree)
    }
}

/// Stack `layers` bottom-up, applying whiteouts as they appear.
fn overlay(layers: &[Layer]) -> FileTree {
    let mut tree = FileTree::new("/");
    for layer in layers {
        for entry in &layer.entries {
            match entry.whiteout_target() {
                Some(target) => {
                    let target = Path::new("/").join(target);
                    if let Err(err) = tree.remove_path(&target) {
                        tracing::debug!(layer = %layer.root.display(), "whiteout skipped: {err}");
                    }
                }
                None => {
                    tree.upsert(&entry.path, entry.is_dir, entry.size);
                }
            }
        }
    }
    tree
}

/// Walk a single layer directory and list its entries, parents first.
pub fn scan_layer(root: &Path, config: &WalkConfig) -> Result<Layer, TreeError> {
    if !std::fs::metadata(root)?.is_dir() {
        return Err(TreeError::NotADirectory(root.to_path_buf()));
    }

    let show_hidden = config.show_hidden;
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(config.respect_gitignore)
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0
                || show_hidden
                || !name.starts_with('.')
                || name.starts_with(WHITEOUT_PREFIX)
        })
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(layer = %root.display(), "skipping entry: {err}");
                continue;
            }
        };
        // The walker yields the layer root itself first.
        if entry.depth() == 0 {
            continue;
        }
        let Ok(path) = entry.path().strip_prefix(root) else {
            continue;
        };
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        let size = if is_dir {
            0
        } else {
            entry.metadata().map(|m| m.len()).unwrap_or(0)
        };
        entries.push(LayerEntry {
            path: path.to_path_buf(),
            is_dir,
            size,
        });
    }

    tracing::debug!(layer = %root.display(), entries = entries.len(), "scanned layer");
    Ok(Layer {
        root: root.to_path_buf(),
        entries,
    })
}

/// Mark every node of `upper` with its diff kind relative to `lower`, and
/// graft paths that only exist in `lower` back in as [`DiffType::Removed`].
fn diff_trees(lower: &FileTree, mut upper: FileTree) -> Result<FileTree, TreeError> {
    let upper_ids: Vec<_> = traversal::parent_first(&upper, traversal::everything)
        .collect::<Result<Vec<_>, _>>()?;
    for visit in upper_ids.into_iter().skip(1) {
        let node = &upper.nodes[visit.id];
        let diff = match lower.find(&node.path).map(|id| &lower.nodes[id]) {
            None => DiffType::Added,
            Some(old) if old.is_dir != node.is_dir => DiffType::Modified,
            Some(old) if !node.is_dir && old.size != node.size => DiffType::Modified,
            Some(_) => DiffType::Unmodified,
        };
        upper.nodes[visit.id].diff = diff;
    }

    for visit in traversal::parent_first(lower, traversal::everything).skip(1) {
        let old = lower.node(visit?.id)?;
        if upper.find(&old.path).is_none() {
            let id = upper.upsert(&old.path, old.is_dir, old.size);
            upper.nodes[id].diff = DiffType::Removed;
        }
    }

    // Unchanged directories with changed contents count as modified.
    for visit in traversal::child_first(&upper, traversal::everything)? {
        let node = &upper.nodes[visit.id];
        if !node.is_dir || node.diff != DiffType::Unmodified {
            continue;
        }
        let changed = node
            .children
            .iter()
            .any(|&child| upper.nodes[child].diff != DiffType::Unmodified);
        if changed {
            upper.nodes[visit.id].diff = DiffType::Modified;
        }
    }

    Ok(upper)
}
