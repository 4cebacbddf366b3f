//! Selection and scroll state, and the actions that move them.
//!
//! Every action takes the tree model and the current frame height as
//! arguments and either completes or leaves the state untouched.  Traversal
//! failures are logged and turn the action into a no-op.

use std::path::PathBuf;

use super::model::TreeModel;
use super::traversal;
use super::tree::{DiffType, FileNode, NodeId};
use super::viewport::ViewportWindow;

/// Selection index, first painted index, and the collapse-all toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    /// Visible index of the highlighted node; `0..=visible_size()`.
    pub selected: usize,
    /// Visible index painted on the first row of the frame.
    pub viewport_top: usize,
    /// What the next collapse-all sets every directory's `collapsed` to.
    pub collapse_all: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            selected: 0,
            viewport_top: 0,
            collapse_all: true,
        }
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the selected node.
    pub fn selected_node<M: TreeModel + ?Sized>(&self, model: &M) -> Option<NodeId> {
        match traversal::resolve_node_at(model, self.selected) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(index = self.selected, "unable to get node position: {err}");
                None
            }
        }
    }

    fn step_down(&mut self, height: usize) {
        self.selected += 1;
        if self.selected.saturating_sub(self.viewport_top) >= height {
            self.viewport_top += 1;
        }
    }

    pub fn move_down<M: TreeModel + ?Sized>(&mut self, model: &M, height: usize) -> bool {
        if self.selected >= model.visible_size() {
            return false;
        }
        self.step_down(height);
        tracing::debug!(
            selected = self.selected,
            viewport_top = self.viewport_top,
            height,
            "move down"
        );
        true
    }

    pub fn move_up(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        if self.selected < self.viewport_top {
            self.viewport_top -= 1;
        }
        tracing::debug!(
            selected = self.selected,
            viewport_top = self.viewport_top,
            "move up"
        );
        true
    }

    /// Expand the selected directory if needed and step onto its first child.
    pub fn move_right<M: TreeModel + ?Sized>(&mut self, model: &mut M, height: usize) -> bool {
        let Some(id) = self.selected_node(&*model) else {
            return false;
        };
        let Some(node) = lookup(&*model, id) else {
            return false;
        };
        if !node.is_dir || node.children.is_empty() {
            return false;
        }
        if node.collapsed {
            if let Err(err) = model.set_collapsed(id, false) {
                tracing::warn!("unable to expand node: {err}");
                return false;
            }
        }
        // Every child may be filtered out.
        if self.selected < model.visible_size() {
            self.step_down(height);
        }
        true
    }

    /// Select the parent of the selected node.
    pub fn move_left<M: TreeModel + ?Sized>(&mut self, model: &M) -> bool {
        let Some(id) = self.selected_node(model) else {
            return false;
        };
        let Some(parent_path) = lookup(model, id)
            .and_then(|node| node.parent)
            .and_then(|parent| lookup(model, parent))
            .map(|parent| parent.path.clone())
        else {
            return false;
        };

        let index = match traversal::resolve_index_of(model, |n| n.path == parent_path) {
            Ok(Some(index)) => index,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(parent = %parent_path.display(), "unable to find parent: {err}");
                return false;
            }
        };

        self.selected = index;
        if index < self.viewport_top {
            self.viewport_top = index;
        }
        true
    }

    pub fn page_down<M: TreeModel + ?Sized>(&mut self, model: &M, height: usize) -> bool {
        let visible_size = model.visible_size();
        self.selected = (self.selected + height).min(visible_size);
        if self.selected >= self.viewport_top + height {
            self.viewport_top = self.selected.min((visible_size + 1).saturating_sub(height));
        }
        true
    }

    pub fn page_up(&mut self, height: usize) -> bool {
        self.selected = self.selected.saturating_sub(height);
        if self.selected < self.viewport_top {
            self.viewport_top = self.selected;
        }
        true
    }

    /// Flip the `collapsed` flag of the selected directory.
    pub fn collapse_dir<M: TreeModel + ?Sized>(&mut self, model: &mut M) -> bool {
        let Some(id) = self.selected_node(&*model) else {
            tracing::debug!("unable to collapse nil node");
            return false;
        };
        let Some(node) = lookup(&*model, id) else {
            return false;
        };
        if !node.is_dir {
            tracing::debug!(path = %node.path.display(), "unable to collapse a file");
            return false;
        }
        let collapsed = !node.collapsed;
        tracing::debug!(path = %node.path.display(), collapsed, "collapsing node");
        match model.set_collapsed(id, collapsed) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("unable to collapse node: {err}");
                false
            }
        }
    }

    /// Set every directory below the root to `collapse_all`, discarding any
    /// per-directory state, then flip the toggle.
    pub fn collapse_or_expand_all<M: TreeModel + ?Sized>(
        &mut self,
        model: &mut M,
        height: usize,
    ) -> bool {
        let mut dirs = Vec::new();
        for visit in traversal::parent_first(&*model, traversal::everything) {
            let visit = match visit {
                Ok(visit) => visit,
                Err(err) => {
                    tracing::warn!("error collapsing all dirs: {err}");
                    return false;
                }
            };
            if visit.depth > 0 && lookup(&*model, visit.id).is_some_and(|n| n.is_dir) {
                dirs.push(visit.id);
            }
        }

        for id in dirs {
            if let Err(err) = model.set_collapsed(id, self.collapse_all) {
                tracing::warn!("error collapsing all dirs: {err}");
                return false;
            }
        }
        self.collapse_all = !self.collapse_all;
        self.resync(&*model, height);
        true
    }

    /// Show or hide a diff kind, then pull the selection back into range.
    pub fn toggle_hidden_file_type<M: TreeModel + ?Sized>(
        &mut self,
        model: &mut M,
        kind: DiffType,
        height: usize,
    ) -> bool {
        let changed = model.toggle_hidden_file_type(kind);
        self.resync(&*model, height);
        changed
    }

    /// Clamp the selection to `0..=visible_size()` and keep it in the frame.
    /// A selection that is still in range stays where it is.
    pub fn resync<M: TreeModel + ?Sized>(&mut self, model: &M, height: usize) {
        let visible_size = model.visible_size();
        if self.selected > visible_size {
            tracing::debug!(from = self.selected, to = visible_size, "selection clamped");
            self.selected = visible_size;
        }
        ViewportWindow::clamp(self, height);
    }

    /// Path of the selected node, for status display.
    pub fn selected_path<M: TreeModel + ?Sized>(&self, model: &M) -> Option<PathBuf> {
        self.selected_node(model)
            .and_then(|id| lookup(model, id))
            .map(|node| node.path.clone())
    }
}

fn lookup<M: TreeModel + ?Sized>(model: &M, id: NodeId) -> Option<&FileNode> {
    match model.node(id) {
        Ok(node) => Some(node),
        Err(err) => {
            tracing::warn!("unable to resolve node: {err}");
            None
        }
    }
}
