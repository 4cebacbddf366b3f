//! Depth-first walks over any [`TreeModel`].
//!
//! The visible index is never stored.  Every lookup re-walks the tree from
//! the root with an evaluator that prunes subtrees, so an index is only ever
//! as stale as the keypress that produced it.

use super::model::{TreeError, TreeModel};
use super::tree::{FileNode, NodeId};

/// One node yielded by a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub id: NodeId,
    /// Depth from the root (0 = root).
    pub depth: usize,
}

/// `!parent.collapsed && !node.hidden`.  The root has no parent and is always
/// visible; a parent that cannot be resolved hides the node.
pub fn is_visible<M: TreeModel + ?Sized>(model: &M, node: &FileNode) -> bool {
    if node.hidden {
        return false;
    }
    match node.parent {
        None => true,
        Some(parent) => model.node(parent).is_ok_and(|p| !p.collapsed),
    }
}

/// Evaluator that keeps every node.
pub fn everything<M: TreeModel + ?Sized>(_model: &M, _node: &FileNode) -> bool {
    true
}

// ───────────────────────────────────────── parent-first ──────

/// Lazy parent-first (pre-order) walk.
///
/// Nodes rejected by the evaluator are skipped together with their subtree.
/// A failed node lookup is yielded once as `Err`, after which the walk ends.
/// Clone a fresh walk to restart it.
pub struct ParentFirst<'a, M: ?Sized, F> {
    model: &'a M,
    evaluator: F,
    stack: Vec<Visit>,
}

impl<M: ?Sized, F: Clone> Clone for ParentFirst<'_, M, F> {
    fn clone(&self) -> Self {
        Self {
            model: self.model,
            evaluator: self.evaluator.clone(),
            stack: self.stack.clone(),
        }
    }
}

/// Start a parent-first walk at the root of `model`.
pub fn parent_first<M, F>(model: &M, evaluator: F) -> ParentFirst<'_, M, F>
where
    M: TreeModel + ?Sized,
    F: Fn(&M, &FileNode) -> bool,
{
    ParentFirst {
        model,
        evaluator,
        stack: vec![Visit {
            id: model.root(),
            depth: 0,
        }],
    }
}

impl<M, F> Iterator for ParentFirst<'_, M, F>
where
    M: TreeModel + ?Sized,
    F: Fn(&M, &FileNode) -> bool,
{
    type Item = Result<Visit, TreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(visit) = self.stack.pop() {
            let node = match self.model.node(visit.id) {
                Ok(node) => node,
                Err(err) => {
                    self.stack.clear();
                    return Some(Err(err));
                }
            };
            if !(self.evaluator)(self.model, node) {
                continue;
            }
            self.stack
                .extend(node.children.iter().rev().map(|&id| Visit {
                    id,
                    depth: visit.depth + 1,
                }));
            return Some(Ok(visit));
        }
        None
    }
}

// ───────────────────────────────────────── child-first ───────

/// Child-first (post-order) walk: every node comes after all of its retained
/// descendants, siblings in order.
pub fn child_first<M, F>(model: &M, evaluator: F) -> Result<Vec<Visit>, TreeError>
where
    M: TreeModel + ?Sized,
    F: Fn(&M, &FileNode) -> bool,
{
    let mut order = Vec::new();
    let mut stack = vec![Visit {
        id: model.root(),
        depth: 0,
    }];
    while let Some(visit) = stack.pop() {
        let node = model.node(visit.id)?;
        if !evaluator(model, node) {
            continue;
        }
        stack.extend(node.children.iter().map(|&id| Visit {
            id,
            depth: visit.depth + 1,
        }));
        order.push(visit);
    }
    order.reverse();
    Ok(order)
}

// ───────────────────────────────────────── index resolution ──

/// The node at visible index `index`, if there is one.
pub fn resolve_node_at<M: TreeModel + ?Sized>(
    model: &M,
    index: usize,
) -> Result<Option<NodeId>, TreeError> {
    for (position, visit) in parent_first(model, is_visible).enumerate() {
        let visit = visit?;
        if position == index {
            return Ok(Some(visit.id));
        }
    }
    Ok(None)
}

/// Visible index of the first node matching `predicate`.
pub fn resolve_index_of<M, P>(model: &M, predicate: P) -> Result<Option<usize>, TreeError>
where
    M: TreeModel + ?Sized,
    P: Fn(&FileNode) -> bool,
{
    for (position, visit) in parent_first(model, is_visible).enumerate() {
        let visit = visit?;
        if predicate(model.node(visit.id)?) {
            return Ok(Some(position));
        }
    }
    Ok(None)
}

/// Count of visible nodes below the root.
pub fn visible_count<M: TreeModel + ?Sized>(model: &M) -> Result<usize, TreeError> {
    let mut count: usize = 0;
    for visit in parent_first(model, is_visible) {
        visit?;
        count += 1;
    }
    Ok(count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::FileTree;
    use crate::test_support::{names, nested_tree};

    #[test]
    fn parent_first_visits_parents_before_children() {
        let tree = nested_tree();
        let order: Vec<_> = parent_first(&tree, everything)
            .map(|v| v.unwrap().id)
            .collect();
        assert_eq!(
            names(&tree, &order),
            ["/", "a", "a1", "a2", "b", "b1", "b1x", "c"]
        );
    }

    #[test]
    fn visible_walk_prunes_collapsed_subtrees() {
        let mut tree = nested_tree();
        let b = tree.find("/b".as_ref()).unwrap();
        tree.set_collapsed(b, true).unwrap();

        let order: Vec<_> = parent_first(&tree, is_visible)
            .map(|v| v.unwrap().id)
            .collect();
        assert_eq!(names(&tree, &order), ["/", "a", "a1", "a2", "b", "c"]);
    }

    #[test]
    fn hidden_nodes_take_their_subtree_with_them() {
        let mut tree = nested_tree();
        let b = tree.find("/b".as_ref()).unwrap();
        tree.nodes[b].hidden = true;

        let order: Vec<_> = parent_first(&tree, is_visible)
            .map(|v| v.unwrap().id)
            .collect();
        assert_eq!(names(&tree, &order), ["/", "a", "a1", "a2", "c"]);
    }

    #[test]
    fn depth_is_reported() {
        let tree = nested_tree();
        let depths: Vec<_> = parent_first(&tree, everything)
            .map(|v| v.unwrap().depth)
            .collect();
        assert_eq!(depths, [0, 1, 2, 2, 1, 2, 3, 1]);
    }

    #[test]
    fn cloned_walk_restarts_independently() {
        let tree = nested_tree();
        let mut walk = parent_first(&tree, everything);
        let fresh = walk.clone();
        walk.next();
        walk.next();
        assert_eq!(fresh.count(), 8);
        assert_eq!(walk.count(), 6);
    }

    #[test]
    fn child_first_visits_children_before_parents() {
        let tree = nested_tree();
        let order: Vec<_> = child_first(&tree, everything)
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(
            names(&tree, &order),
            ["a1", "a2", "a", "b1x", "b1", "b", "c", "/"]
        );
    }

    #[test]
    fn resolves_index_to_node_and_back() {
        let tree = nested_tree();
        let b1 = tree.find("/b/b1".as_ref()).unwrap();

        assert_eq!(resolve_node_at(&tree, 5).unwrap(), Some(b1));
        assert_eq!(
            resolve_index_of(&tree, |n| n.path.as_path() == std::path::Path::new("/b/b1"))
                .unwrap(),
            Some(5)
        );
        assert_eq!(resolve_node_at(&tree, 8).unwrap(), None);
        assert_eq!(visible_count(&tree).unwrap(), 7);
    }

    #[test]
    fn dangling_child_is_reported_once() {
        let mut tree = FileTree::new("/");
        let root = tree.root;
        tree.nodes[root].children.push(42);

        let mut walk = parent_first(&tree, everything);
        assert!(walk.next().unwrap().is_ok());
        assert!(matches!(walk.next(), Some(Err(TreeError::UnknownNode(42)))));
        assert!(walk.next().is_none());

        assert!(resolve_node_at(&tree, 1).is_err());
        assert!(child_first(&tree, everything).is_err());
    }
}
