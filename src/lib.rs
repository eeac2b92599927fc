//! # Distance-Matrix Tree Construction
//!
//! Builds rooted binary trees from a symmetric matrix of pairwise distances
//! between named items, using Neighbor-Joining or average linkage (UPGMA).
//!
//! ## Pipeline
//!
//! 1. **Validation**: the matrix must match the item count, be finite,
//!    non-negative and symmetric
//! 2. **Agglomeration**: repeatedly join the best pair of active clusters
//!    under a new internal node, rewriting the matrix in place
//! 3. **Finishing**: optional re-rooting at the longest leaf branch, then
//!    node heights and a left-to-right layout order
//! 4. **Reconciliation**: leaves of externally built trees are bound to the
//!    loaded items by name, with placeholders for the rest
//!
//! ## Usage Example
//!
//! ```
//! use phylo_cluster::{items_from_names, BuildConfig, DistanceMatrix, TreeBuilder};
//!
//! let items = items_from_names(&["a", "b", "c"]);
//! let matrix = DistanceMatrix::from_rows(vec![
//!     vec![0.0, 2.0, 4.0],
//!     vec![2.0, 0.0, 4.0],
//!     vec![4.0, 4.0, 0.0],
//! ])?;
//! let outcome = TreeBuilder::new(BuildConfig::average_linkage()).run(&items, matrix)?;
//! assert_eq!(outcome.tree.leaf_count(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod cluster; // Agglomerative engine and linkage strategies
pub mod item; // Items referenced by leaves
pub mod ledger; // Merge record and clamp diagnostics
pub mod matrix; // Validated distance matrix
pub mod model; // Distance model collaborators
pub mod reconcile; // Leaf-to-item binding
pub mod tree; // Arena tree, traversal and finishing passes

// Re-exports for convenience
pub use cluster::{build_tree, Algorithm, ClusterEngine, ClusterSet, Clustering};
pub use item::{items_from_names, Item};
pub use ledger::{ClampedBranch, MergeLedger, MergeStep};
pub use matrix::{DistanceMatrix, InputError};
pub use model::{DistanceModel, ModelError, ModelRegistry, PercentIdentity};
pub use reconcile::{match_leaves_to_items, refresh, MatchKind, ReconcileReport};
pub use tree::{NodeId, TopologyBuilder, Tree, TreeNode};

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors that can occur while building or editing trees
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Matrix, item list or selector rejected before any work was done
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Node id does not belong to this tree
    #[error("unknown node #{0}")]
    UnknownNode(usize),

    /// Externally supplied topology is not a rooted binary tree
    #[error("malformed topology: {0}")]
    MalformedTopology(String),

    /// Distance model failed
    #[error("distance model failed: {0}")]
    Model(#[from] ModelError),

    /// Engine state became inconsistent
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the crate.
pub type TreeResult<T> = Result<T, TreeError>;

/// Non-fatal conditions raised while building or reconciling.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A negative branch length was clamped to zero
    DegenerateResult {
        /// Node whose branch was clamped
        node: NodeId,
        /// Length before clamping
        raw_length: f64,
    },

    /// A leaf name matched no item and now carries a placeholder
    UnresolvedLeaf {
        /// Leaf node
        node: NodeId,
        /// Name that failed to resolve
        name: String,
    },
}

/// Configuration parameters for tree building
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Agglomeration strategy
    pub algorithm: Algorithm,

    /// Re-root at the leaf with the longest branch after clustering
    pub reroot_at_max_distance: bool,

    /// Relative tolerance for `d[i][j]` vs `d[j][i]`
    pub symmetry_tolerance: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

impl BuildConfig {
    /// Configuration for `algorithm` with default settings.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            reroot_at_max_distance: false,
            symmetry_tolerance: matrix::DEFAULT_SYMMETRY_TOLERANCE,
        }
    }

    /// Neighbor-Joining defaults.
    pub fn neighbor_joining() -> Self {
        Self::new(Algorithm::NeighborJoining)
    }

    /// Average linkage (UPGMA) defaults.
    pub fn average_linkage() -> Self {
        Self::new(Algorithm::AverageLinkage)
    }

    /// Parse an algorithm selector such as `"NJ"`, `"AV"` or `"UPGMA"`.
    pub fn from_selector(selector: &str) -> TreeResult<Self> {
        Ok(Self::new(selector.parse()?))
    }

    /// Enable or disable re-rooting at the longest leaf branch.
    pub fn with_reroot_at_max_distance(mut self, reroot: bool) -> Self {
        self.reroot_at_max_distance = reroot;
        self
    }

    /// Override the symmetry tolerance.
    pub fn with_symmetry_tolerance(mut self, tolerance: f64) -> Self {
        self.symmetry_tolerance = tolerance;
        self
    }
}

/// Result of a build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Finished tree, heights and layout assigned
    pub tree: Tree,

    /// Merge steps and clamped branches
    pub ledger: MergeLedger,

    /// Final cluster partition
    pub clusters: ClusterSet,

    /// Leaf the tree was re-rooted at, if re-rooting was requested
    pub rerooted_at: Option<NodeId>,
}

impl BuildOutcome {
    /// Clamped branches reported as warnings.
    pub fn warnings(&self) -> Vec<Warning> {
        self.ledger
            .clamped()
            .iter()
            .map(|clamp| Warning::DegenerateResult {
                node: clamp.node,
                raw_length: clamp.raw_length,
            })
            .collect()
    }
}

/// Tree building orchestrator
///
/// Runs validation, clustering, optional re-rooting and the finishing
/// passes for one configuration.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    config: BuildConfig,
}

impl TreeBuilder {
    /// Create new builder
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build a tree over `items` from a precomputed matrix.
    #[instrument(level = "info", skip_all, fields(algorithm = %self.config.algorithm, items = items.len()))]
    pub fn run(&self, items: &[Arc<Item>], matrix: DistanceMatrix) -> TreeResult<BuildOutcome> {
        let engine = ClusterEngine::new(self.config.algorithm)
            .with_symmetry_tolerance(self.config.symmetry_tolerance);
        let Clustering {
            mut tree,
            clusters,
            ledger,
        } = engine.build(items, matrix)?;

        if !ledger.all_merges_complete() {
            return Err(TreeError::Internal(format!(
                "expected {} merges, recorded {}",
                items.len().saturating_sub(1),
                ledger.steps().len()
            )));
        }

        let mut rerooted_at = None;
        if self.config.reroot_at_max_distance {
            let pivot = tree.find_max_distance_leaf(tree.root());
            let root = tree.reroot(pivot)?;
            tree.compute_heights(root);
            tree.assign_layout_order(root);
            debug!(%pivot, max_height = tree.max_height(), "re-rooted at longest leaf branch");
            rerooted_at = Some(pivot);
        }

        info!(
            leaves = tree.leaf_count(),
            clamped = ledger.clamped_count(),
            "build complete"
        );
        Ok(BuildOutcome {
            tree,
            ledger,
            clusters,
            rerooted_at,
        })
    }

    /// Compute distances with `model`, then build.
    pub fn run_with_model(
        &self,
        items: &[Arc<Item>],
        model: &dyn DistanceModel,
    ) -> TreeResult<BuildOutcome> {
        debug!(model = model.name(), "computing distances");
        let matrix = model.compute_distances(items)?;
        self.run(items, matrix)
    }
}
