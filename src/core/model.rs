//! The capability set the navigation core needs from a tree backend.
//!
//! Navigation never owns the tree; it borrows a [`TreeModel`] for the length
//! of a single action.  Traversal is not part of the trait: it is provided
//! once, for every backend, by [`super::traversal`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::tree::{DiffType, FileNode, NodeId};

/// Failures reported by a tree backend.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("node {0} does not exist in the tree")]
    UnknownNode(NodeId),
    #[error("no node at path {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("the root node cannot be removed")]
    RemoveRoot,
    #[error("layer {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Operations a tree backend exposes to the navigation core.
///
/// `collapsed` (through [`TreeModel::set_collapsed`]) and `hidden` (through
/// [`TreeModel::toggle_hidden_file_type`]) are the only node fields the core
/// is allowed to change.
pub trait TreeModel {
    /// Id of the root node.  The root is always visible index 0.
    fn root(&self) -> NodeId;

    /// Look up a node by id.
    fn node(&self, id: NodeId) -> Result<&FileNode, TreeError>;

    /// Set the `collapsed` flag of a directory node.
    fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<(), TreeError>;

    /// Pre-formatted text for the visible-index window `[lower, upper)`, one
    /// line per node, joined by `\n`.
    fn string_between(&self, lower: usize, upper: usize, show_attributes: bool) -> String;

    /// Detach the node at `path` (and its subtree) from the tree.
    fn remove_path(&mut self, path: &Path) -> Result<(), TreeError>;

    /// Number of visible nodes below the root.
    fn visible_size(&self) -> usize;

    /// Switch to another layer.  Returns `true` when the tree changed.
    fn set_layer_index(&mut self, index: usize) -> bool;

    /// Show or hide every node of the given diff kind.
    fn toggle_hidden_file_type(&mut self, kind: DiffType) -> bool;
}
