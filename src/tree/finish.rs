//! Post-processing over a finished tree: heights, re-rooting, layout order
//! and threshold grouping.

use tracing::{debug, instrument};

use super::{NodeId, Tree};
use crate::{TreeError, TreeResult};

impl Tree {
    /// Set `height = parent.height + branch_length` for every node below
    /// `start` and return the largest leaf height found.
    ///
    /// `start` itself is placed at its parent's height plus its branch, or
    /// at 0 when it has no parent. A pass from the root also refreshes
    /// [`Tree::max_height`].
    pub fn compute_heights(&mut self, start: NodeId) -> f64 {
        self[start].height = match self[start].parent {
            Some(parent) => self[parent].height + self[start].branch_length,
            None => 0.0,
        };

        let mut max_height = 0.0_f64;
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            match self[id].children() {
                Some((left, right)) => {
                    let base = self[id].height;
                    for child in [right, left] {
                        self[child].height = base + self[child].branch_length;
                        stack.push(child);
                    }
                }
                None => max_height = max_height.max(self[id].height),
            }
        }

        if start == self.root() {
            self.set_max_height(max_height);
        }
        max_height
    }

    /// Leaf under `start` with the largest branch length (first one, left
    /// to right, on ties).
    pub fn find_max_distance_leaf(&self, start: NodeId) -> NodeId {
        let mut best = start;
        let mut best_length = f64::NEG_INFINITY;
        for id in self.preorder(start) {
            let node = &self[id];
            if node.is_leaf() && node.branch_length > best_length {
                best = id;
                best_length = node.branch_length;
            }
        }
        best
    }

    /// Re-hang the tree so a new root sits halfway along `pivot`'s branch.
    ///
    /// Parent/child links on the path from `pivot` to the old root are
    /// reversed, each edge keeping its length. The old root's two edges
    /// are fused into one and its arena slot is reused for the new root, so
    /// the node count and the total tree length are unchanged.
    ///
    /// Heights and layout are stale afterwards; rerun
    /// [`Tree::compute_heights`] and [`Tree::assign_layout_order`].
    #[instrument(level = "debug", skip(self))]
    pub fn reroot(&mut self, pivot: NodeId) -> TreeResult<NodeId> {
        self.check(pivot)?;
        let root = self.root();
        if pivot == root {
            return Ok(root);
        }

        let path: Vec<NodeId> = self.path_to_root(pivot).iter().map(|step| step.node).collect();
        let m = path.len() - 1;
        let (root_left, root_right) = self[root].children().ok_or_else(|| {
            TreeError::MalformedTopology(format!("root {} has a parent chain but no children", root))
        })?;

        let original: Vec<f64> = path.iter().map(|&id| self[id].branch_length).collect();
        let half = original[0] / 2.0;
        let top = path[m - 1];
        let sibling = if root_left == top { root_right } else { root_left };

        if m == 1 {
            // Pivot already hangs off the root; only the lengths move.
            self[sibling].branch_length += half;
            self[pivot].branch_length = half;
            self[root].left = Some(sibling);
            self[root].right = Some(pivot);
            debug!(%pivot, "pivot was a child of the root");
            return Ok(root);
        }

        // Fuse the old root's edges: the sibling now hangs from `top`.
        self[sibling].branch_length += original[m - 1];
        self[sibling].parent = Some(top);

        // Reverse the path. Node c[t] becomes the child of c[t-1], and the
        // slot that held c[t-1] now holds c[t]'s former parent.
        for t in 1..m {
            let node = path[t];
            let former_child = path[t - 1];
            let former_parent = if t + 1 < m { path[t + 1] } else { sibling };
            self[node].replace_child(former_child, former_parent);
            self[node].parent = Some(former_child);
            self[node].branch_length = if t == 1 { half } else { original[t - 1] };
        }

        let first = path[1];
        self[first].parent = Some(root);
        self[pivot].parent = Some(root);
        self[pivot].branch_length = half;

        let new_root = &mut self[root];
        new_root.left = Some(first);
        new_root.right = Some(pivot);
        new_root.parent = None;
        new_root.branch_length = 0.0;

        debug!(%pivot, path_len = m, "re-rooted tree");
        Ok(root)
    }

    /// Post-order pass assigning leaf `count = 1` with increasing `y_order`,
    /// and for internal nodes `count = l + r`, `y_order = (l + r) / 2`.
    pub fn assign_layout_order(&mut self, start: NodeId) {
        let order: Vec<NodeId> = self.postorder(start).collect();
        let mut next_leaf = 0.0;
        for id in order {
            match self[id].children() {
                Some((left, right)) => {
                    let count = self[left].count + self[right].count;
                    let y_order = (self[left].y_order + self[right].y_order) / 2.0;
                    let node = &mut self[id];
                    node.count = count;
                    node.y_order = y_order;
                }
                None => {
                    let node = &mut self[id];
                    node.count = 1;
                    node.y_order = next_leaf;
                    next_leaf += 1.0;
                }
            }
        }
    }

    /// Topmost nodes whose height exceeds `threshold` as a fraction of the
    /// maximum height; each returned subtree is one group.
    ///
    /// Requires a height pass from the root. Returns nothing for trees of
    /// zero height.
    pub fn find_clusters(&self, threshold: f64) -> Vec<NodeId> {
        let max_height = self.max_height();
        let mut groups = Vec::new();
        if max_height <= 0.0 {
            return groups;
        }

        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            if node.height / max_height > threshold {
                groups.push(id);
            } else if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
            }
        }
        groups
    }
}
