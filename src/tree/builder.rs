//! Assemble trees produced outside the clustering engine (e.g. by a tree
//! file reader) into the arena representation.

use std::sync::Arc;

use tracing::debug;

use super::{NodeId, Tree, TreeNode};
use crate::item::Item;
use crate::{TreeError, TreeResult};

/// Bottom-up builder: create leaves, join them, then `finish` at the root.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    nodes: Vec<TreeNode>,
    problems: Vec<String>,
}

impl TopologyBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named leaf with no payload yet.
    pub fn leaf(&mut self, name: impl Into<String>, branch_length: f64) -> NodeId {
        let node = TreeNode {
            branch_length,
            ..TreeNode::leaf(Some(name.into()), None)
        };
        self.push(node)
    }

    /// Add a leaf already bound to an item.
    pub fn leaf_with_item(&mut self, item: Arc<Item>, branch_length: f64) -> NodeId {
        let node = TreeNode {
            branch_length,
            ..TreeNode::leaf(Some(item.name().to_string()), Some(item))
        };
        self.push(node)
    }

    /// Join two existing nodes under a new internal node.
    pub fn internal(&mut self, left: NodeId, right: NodeId, branch_length: f64) -> NodeId {
        let parent = NodeId(self.nodes.len());
        if left == right {
            self.problems
                .push(format!("node {} used as both children of {}", left, parent));
        }
        for child in [left, right] {
            match self.nodes.get_mut(child.0) {
                Some(node) if node.parent.is_some() => {
                    self.problems
                        .push(format!("node {} has more than one parent", child));
                }
                Some(node) => node.parent = Some(parent),
                None => self.problems.push(format!("unknown child {}", child)),
            }
        }
        let node = TreeNode {
            branch_length,
            ..TreeNode::internal(left, right)
        };
        self.push(node)
    }

    /// Attach a bootstrap value to a node.
    pub fn bootstrap(&mut self, node: NodeId, value: i32) -> &mut Self {
        match self.nodes.get_mut(node.0) {
            Some(target) => target.bootstrap = Some(value),
            None => self.problems.push(format!("unknown node {}", node)),
        }
        self
    }

    /// Validate and produce the tree rooted at `root`.
    ///
    /// Fails if any node was given two parents, if `root` has a parent, or
    /// if some node is not reachable from `root`.
    pub fn finish(self, root: NodeId) -> TreeResult<Tree> {
        if let Some(problem) = self.problems.into_iter().next() {
            return Err(TreeError::MalformedTopology(problem));
        }
        let Some(root_node) = self.nodes.get(root.0) else {
            return Err(TreeError::UnknownNode(root.0));
        };
        if root_node.parent.is_some() {
            return Err(TreeError::MalformedTopology(format!(
                "root {} has a parent",
                root
            )));
        }

        let has_distances = self.nodes.iter().any(|node| node.branch_length != 0.0);
        let has_bootstrap = self.nodes.iter().any(|node| node.bootstrap.is_some());
        let has_root_distance = root_node.branch_length != 0.0;

        let mut tree = Tree::with_capacity(self.nodes.len());
        for node in self.nodes {
            tree.push(node);
        }
        tree.set_root(root);
        tree.set_flags(has_distances, has_bootstrap, has_root_distance);

        let reachable = tree.preorder(root).count();
        if reachable != tree.len() {
            return Err(TreeError::MalformedTopology(format!(
                "{} of {} nodes are not reachable from root {}",
                tree.len() - reachable,
                tree.len(),
                root
            )));
        }

        let root = tree.root();
        tree.compute_heights(root);
        tree.assign_layout_order(root);
        debug!(
            nodes = tree.len(),
            leaves = tree.leaf_count(),
            "assembled external topology"
        );
        Ok(tree)
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}
