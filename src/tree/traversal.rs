//! Stack-based traversal
//!
//! Iterators keep an explicit stack of node ids instead of recursing, so
//! deep caterpillar trees (one merge per level) cannot overflow the call
//! stack.

use super::{NodeId, Tree};

/// Which child slot of the parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Node is its parent's left child.
    Left,

    /// Node is its parent's right child.
    Right,
}

/// One hop on the path from a node up to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Node on the path.
    pub node: NodeId,

    /// Slot the node occupies under its parent (`None` for the root).
    pub direction: Option<Direction>,
}

/// Pre-order (node, left, right) traversal.
#[derive(Debug)]
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(tree: &'a Tree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some((left, right)) = self.tree[current].children() {
            // Right first so left is popped next
            self.stack.push(right);
            self.stack.push(left);
        }
        Some(current)
    }
}

/// Post-order (left, right, node) traversal.
#[derive(Debug)]
pub struct PostOrder<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrder<'a> {
    pub(crate) fn new(tree: &'a Tree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, expanded)) = self.stack.pop() {
            match self.tree[current].children() {
                Some((left, right)) if !expanded => {
                    self.stack.push((current, true));
                    self.stack.push((right, false));
                    self.stack.push((left, false));
                }
                _ => return Some(current),
            }
        }
        None
    }
}

impl Tree {
    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn preorder(&self, start: NodeId) -> PreOrder<'_> {
        PreOrder::new(self, start)
    }

    /// Post-order traversal of the subtree rooted at `start`.
    pub fn postorder(&self, start: NodeId) -> PostOrder<'_> {
        PostOrder::new(self, start)
    }

    /// Path from `node` up to and including the root.
    pub fn path_to_root(&self, node: NodeId) -> Vec<PathStep> {
        let mut path = Vec::new();
        let mut current = node;
        loop {
            let parent = self[current].parent;
            let direction = parent.map(|p| {
                if self[p].left == Some(current) {
                    Direction::Left
                } else {
                    Direction::Right
                }
            });
            path.push(PathStep {
                node: current,
                direction,
            });
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        path
    }
}
