//! Agglomerative clustering engine
//!
//! Consumes a validated distance matrix and builds a rooted binary tree by
//! repeatedly joining the best pair of active clusters. The matrix is owned
//! for the duration of the build and updated in place; retired slots are
//! masked by the cluster set, never removed.

mod linkage;
mod set;

pub use linkage::Algorithm;
pub use set::ClusterSet;

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use self::linkage::{average_linkage_branches, divergence, neighbor_joining_branches, Selection};
use crate::item::Item;
use crate::ledger::{MergeLedger, MergeStep};
use crate::matrix::{DistanceMatrix, DEFAULT_SYMMETRY_TOLERANCE};
use crate::tree::{NodeId, Tree, TreeNode};
use crate::{TreeError, TreeResult};

/// Result of one clustering run.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Finished tree, heights and layout already assigned.
    pub tree: Tree,
    /// Final partition (a single active slot once N ≥ 1).
    pub clusters: ClusterSet,
    /// Merge steps and clamped branches.
    pub ledger: MergeLedger,
}

/// Builds trees from distance matrices with a fixed linkage strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterEngine {
    algorithm: Algorithm,
    symmetry_tolerance: f64,
}

impl ClusterEngine {
    /// Engine for `algorithm` with the default symmetry tolerance.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            symmetry_tolerance: DEFAULT_SYMMETRY_TOLERANCE,
        }
    }

    /// Relative tolerance allowed between `d[i][j]` and `d[j][i]`.
    pub fn with_symmetry_tolerance(mut self, tolerance: f64) -> Self {
        self.symmetry_tolerance = tolerance;
        self
    }

    /// Linkage strategy in use.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Cluster `items` using `matrix`.
    ///
    /// The matrix is validated before anything is built; on error no tree
    /// is produced. Leaf `k` of the arena corresponds to `items[k]`.
    #[instrument(level = "debug", skip_all, fields(algorithm = %self.algorithm, items = items.len()))]
    pub fn build(&self, items: &[Arc<Item>], mut matrix: DistanceMatrix) -> TreeResult<Clustering> {
        matrix.ensure_size(items.len())?;
        matrix.validate(self.symmetry_tolerance)?;

        let n = items.len();
        info!(algorithm = %self.algorithm, items = n, "building tree");

        let mut tree = Tree::with_capacity(2 * n - 1);
        // Node currently representing the cluster at each slot.
        let mut slot_nodes: Vec<NodeId> = items
            .iter()
            .map(|item| {
                tree.push(TreeNode::leaf(
                    Some(item.name().to_string()),
                    Some(Arc::clone(item)),
                ))
            })
            .collect();
        let mut clusters = ClusterSet::singletons(n);
        let mut ledger = MergeLedger::new(n);

        while clusters.active_count() > 2 {
            let selection = self
                .algorithm
                .select_pair(&matrix, &clusters)
                .ok_or_else(|| {
                    TreeError::Internal(format!(
                        "no selectable pair among {} active clusters",
                        clusters.active_count()
                    ))
                })?;
            self.join(
                &mut tree,
                &mut matrix,
                &mut clusters,
                &mut ledger,
                &mut slot_nodes,
                selection,
            );
        }

        if clusters.active_count() == 2 {
            let remaining: Vec<usize> = clusters.active_slots().collect();
            let (earlier, later) = match remaining[..] {
                [earlier, later] => (earlier, later),
                _ => {
                    return Err(TreeError::Internal(
                        "two active clusters reported but not found".to_string(),
                    ))
                }
            };
            let distance = matrix.get(later, earlier);
            let selection = Selection {
                kept: later,
                absorbed: earlier,
                score: distance,
            };
            self.join(
                &mut tree,
                &mut matrix,
                &mut clusters,
                &mut ledger,
                &mut slot_nodes,
                selection,
            );
        }

        let root = clusters
            .active_slots()
            .next()
            .map(|slot| slot_nodes[slot])
            .ok_or_else(|| TreeError::Internal("no cluster left after merging".to_string()))?;
        tree.set_root(root);
        tree.set_flags(true, false, true);
        tree.compute_heights(root);
        tree.assign_layout_order(root);

        if ledger.any_clamped() {
            warn!(
                clamped = ledger.clamped_count(),
                "negative branch lengths were clamped to zero"
            );
        }
        info!(
            nodes = tree.len(),
            merges = ledger.steps().len(),
            max_height = tree.max_height(),
            "tree built"
        );

        Ok(Clustering {
            tree,
            clusters,
            ledger,
        })
    }

    /// Merge the clusters at `selection.kept` and `selection.absorbed`
    /// under a new node; the union stays at `kept`.
    fn join(
        &self,
        tree: &mut Tree,
        matrix: &mut DistanceMatrix,
        clusters: &mut ClusterSet,
        ledger: &mut MergeLedger,
        slot_nodes: &mut [NodeId],
        selection: Selection,
    ) {
        let Selection {
            kept,
            absorbed,
            score,
        } = selection;
        let distance = matrix.get(kept, absorbed);
        let left = slot_nodes[kept];
        let right = slot_nodes[absorbed];

        let (raw_left, raw_right) = match self.algorithm {
            Algorithm::AverageLinkage => average_linkage_branches(
                distance,
                tree.left_chain_depth(left),
                tree.left_chain_depth(right),
            ),
            Algorithm::NeighborJoining => {
                let active = clusters.active_count();
                let sums = linkage::active_row_sums(matrix, clusters);
                neighbor_joining_branches(
                    distance,
                    divergence(sums[kept], distance, active),
                    divergence(sums[absorbed], distance, active),
                )
            }
        };
        let left_length = ledger.clamp(left, raw_left);
        let right_length = ledger.clamp(right, raw_right);
        for (node, raw) in [(left, raw_left), (right, raw_right)] {
            if raw < 0.0 {
                warn!(%node, raw_length = raw, "clamped negative branch length");
            }
        }
        tree[left].branch_length = left_length;
        tree[right].branch_length = right_length;

        let updates = self
            .algorithm
            .updated_distances(matrix, clusters, kept, absorbed);
        for (other, value) in updates {
            matrix.set(kept, other, value);
        }
        matrix.set(kept, kept, 0.0);

        let sizes = (clusters.size(kept), clusters.size(absorbed));
        clusters.merge(kept, absorbed);

        let node = tree.push_internal(left, right);
        let count = tree[left].count + tree[right].count;
        tree[node].count = count;
        slot_nodes[kept] = node;

        debug!(
            kept,
            absorbed,
            score,
            distance,
            %node,
            left_length,
            right_length,
            "merged clusters"
        );
        ledger.record_merge(MergeStep {
            kept_slot: kept,
            absorbed_slot: absorbed,
            score,
            distance,
            sizes,
            node,
            branch_lengths: (left_length, right_length),
        });
    }
}

/// Build a tree over `items` from `matrix` with `algorithm` and default
/// settings.
pub fn build_tree(
    items: &[Arc<Item>],
    matrix: DistanceMatrix,
    algorithm: Algorithm,
) -> TreeResult<Tree> {
    ClusterEngine::new(algorithm)
        .build(items, matrix)
        .map(|clustering| clustering.tree)
}
