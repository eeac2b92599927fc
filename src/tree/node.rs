//! Arena tree node
//!
//! Links (parent, left, right) are indices into the owning `Tree`'s node
//! vector, so restructuring a tree is index reassignment only.

use std::fmt;
use std::sync::Arc;

use crate::item::Item;

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Binary tree node.
///
/// Leaves have neither child; internal nodes always have both.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct TreeNode {
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,

    #[cfg_attr(feature = "visualize", serde(skip))]
    pub(crate) payload: Option<Arc<Item>>,
    pub(crate) name: Option<String>,
    pub(crate) placeholder: bool,

    /// Distance from this node to its parent.
    pub branch_length: f64,

    /// Cumulative branch length from the root (derived).
    pub height: f64,

    /// Number of leaves in this subtree (derived).
    pub count: usize,

    /// Vertical layout position (derived).
    pub y_order: f64,

    /// Bootstrap support, when the tree came from a source that carries it.
    pub bootstrap: Option<i32>,
}

impl TreeNode {
    pub(crate) fn leaf(name: Option<String>, payload: Option<Arc<Item>>) -> Self {
        Self {
            name,
            payload,
            count: 1,
            ..Self::default()
        }
    }

    pub(crate) fn internal(left: NodeId, right: NodeId) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            ..Self::default()
        }
    }

    /// Check if leaf (no children)
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Left child.
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child.
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Both children, if internal.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.left.zip(self.right)
    }

    /// Parent node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attached item (leaves only).
    pub fn payload(&self) -> Option<&Arc<Item>> {
        self.payload.as_ref()
    }

    /// Whether the payload is a synthetic placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Node label: the stored name, falling back to the payload's name.
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.payload.as_deref().map(Item::name))
    }

    /// Replace the node label.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) {
        if self.left == Some(old) {
            self.left = Some(new);
        } else if self.right == Some(old) {
            self.right = Some(new);
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self.children()) {
            (Some(name), None) => write!(f, "{}:{:.4}", name, self.branch_length),
            (None, None) => write!(f, "?:{:.4}", self.branch_length),
            (_, Some((left, right))) => {
                write!(f, "({}, {}):{:.4}", left, right, self.branch_length)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_and_internal_shapes() {
        let leaf = TreeNode::leaf(Some("a".into()), None);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.count, 1);
        assert_eq!(leaf.children(), None);

        let internal = TreeNode::internal(NodeId(0), NodeId(1));
        assert!(!internal.is_leaf());
        assert_eq!(internal.children(), Some((NodeId(0), NodeId(1))));
    }

    #[test]
    fn name_falls_back_to_payload() {
        let item = Arc::new(Item::named("SeqA"));
        let mut node = TreeNode::leaf(None, Some(item));
        assert_eq!(node.name(), Some("SeqA"));
        node.set_name("renamed");
        assert_eq!(node.name(), Some("renamed"));
    }

    #[test]
    fn replace_child_swaps_matching_slot() {
        let mut node = TreeNode::internal(NodeId(0), NodeId(1));
        node.replace_child(NodeId(1), NodeId(5));
        assert_eq!(node.children(), Some((NodeId(0), NodeId(5))));
        node.replace_child(NodeId(9), NodeId(7));
        assert_eq!(node.children(), Some((NodeId(0), NodeId(5))));
    }

    #[test]
    fn display_formats_leaf_and_internal() {
        let leaf = TreeNode {
            branch_length: 0.5,
            ..TreeNode::leaf(Some("x".into()), None)
        };
        assert_eq!(leaf.to_string(), "x:0.5000");
        let internal = TreeNode::internal(NodeId(2), NodeId(3));
        assert_eq!(internal.to_string(), "(#2, #3):0.0000");
    }
}
