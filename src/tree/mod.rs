//! Arena-backed binary tree
//!
//! Every node lives in one `Vec<TreeNode>` owned by the `Tree` and is
//! addressed by `NodeId`. The arena only ever holds nodes reachable from the
//! root: clustering appends nodes, and re-rooting recycles the old root's
//! slot for the new one.

mod builder;
mod finish;
mod node;
mod traversal;

pub use builder::TopologyBuilder;
pub use node::{NodeId, TreeNode};
pub use traversal::{Direction, PathStep, PostOrder, PreOrder};

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use crate::item::Item;
use crate::{TreeError, TreeResult};

/// Rooted binary tree with branch lengths and layout metadata.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: NodeId,
    max_height: f64,
    has_distances: bool,
    has_bootstrap: bool,
    has_root_distance: bool,
}

impl Tree {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: NodeId(0),
            max_height: 0.0,
            has_distances: false,
            has_bootstrap: false,
            has_root_distance: false,
        }
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Append an internal node above `left` and `right`.
    pub(crate) fn push_internal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let parent = self.push(TreeNode::internal(left, right));
        self.nodes[left.0].parent = Some(parent);
        self.nodes[right.0].parent = Some(parent);
        parent
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn set_flags(&mut self, distances: bool, bootstrap: bool, root_distance: bool) {
        self.has_distances = distances;
        self.has_bootstrap = bootstrap;
        self.has_root_distance = root_distance;
    }

    /// Root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a finished tree; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node lookup that tolerates foreign ids.
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Mutable node lookup that tolerates foreign ids.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn check(&self, id: NodeId) -> TreeResult<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id.0))
        }
    }

    /// Maximum root-to-leaf height found by the last full height pass.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub(crate) fn set_max_height(&mut self, height: f64) {
        self.max_height = height;
    }

    /// Whether branch lengths are real distances.
    pub fn has_distances(&self) -> bool {
        self.has_distances
    }

    /// Whether nodes carry bootstrap values.
    pub fn has_bootstrap(&self) -> bool {
        self.has_bootstrap
    }

    /// Whether the root carries its own branch length.
    pub fn has_root_distance(&self) -> bool {
        self.has_root_distance
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Number of internal nodes.
    pub fn internal_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.leaves_under(self.root)
    }

    /// Leaves of the subtree rooted at `node`, left to right.
    pub fn leaves_under(&self, node: NodeId) -> Vec<NodeId> {
        self.preorder(node)
            .filter(|&id| self[id].is_leaf())
            .collect()
    }

    /// Leaf labels in left-to-right order (unnamed leaves are skipped).
    pub fn leaf_names(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self[id].name())
            .collect()
    }

    /// First leaf (left to right) whose payload is `item`.
    pub fn find_leaf_for_item(&self, item: &Arc<Item>) -> Option<NodeId> {
        self.leaves().into_iter().find(|&id| {
            self[id]
                .payload
                .as_ref()
                .is_some_and(|payload| Arc::ptr_eq(payload, item))
        })
    }

    /// Sum of all branch lengths below the root.
    pub fn total_length(&self) -> f64 {
        self.nodes
            .iter()
            .filter(|node| !node.is_root())
            .map(|node| node.branch_length)
            .sum()
    }

    /// Apply `visitor` to every node exactly once (arena order).
    pub fn apply_to_all_nodes<F>(&mut self, mut visitor: F)
    where
        F: FnMut(NodeId, &mut TreeNode),
    {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            visitor(NodeId(index), node);
        }
    }

    /// Sum of branch lengths along `node` and its chain of left children.
    pub(crate) fn left_chain_depth(&self, node: NodeId) -> f64 {
        let mut depth = 0.0;
        let mut current = Some(node);
        while let Some(id) = current {
            depth += self[id].branch_length;
            current = self[id].left;
        }
        depth
    }

    /// Digest of shape, labels and branch lengths in pre-order.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for id in self.preorder(self.root) {
            let node = &self[id];
            hasher.update(&[u8::from(node.is_leaf())]);
            let name = node.name().unwrap_or_default();
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update(&node.branch_length.to_bits().to_le_bytes());
        }
        hasher.finalize()
    }
}

impl Index<NodeId> for Tree {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }
}
