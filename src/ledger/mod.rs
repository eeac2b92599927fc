//! Merge ledger
//!
//! Records every join performed by the clustering engine, in order, plus
//! the branches whose computed length went negative and was clamped to
//! zero. Clamp flags are one bit per tree node.

use bitvec::prelude::*;

use crate::tree::NodeId;

/// One agglomeration step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct MergeStep {
    /// Matrix slot that keeps the merged cluster.
    pub kept_slot: usize,
    /// Matrix slot retired by the merge.
    pub absorbed_slot: usize,
    /// Selection score of the chosen pair (equals the distance for average
    /// linkage; the final join reports the raw distance).
    pub score: f64,
    /// Distance between the two clusters at merge time.
    pub distance: f64,
    /// Cluster sizes before merging (kept, absorbed).
    pub sizes: (usize, usize),
    /// Node created for the merge.
    pub node: NodeId,
    /// Branch lengths assigned to the (kept, absorbed) children after
    /// clamping.
    pub branch_lengths: (f64, f64),
}

/// A negative branch length replaced by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct ClampedBranch {
    /// Node whose branch was clamped.
    pub node: NodeId,
    /// Length computed before clamping.
    pub raw_length: f64,
}

/// Ordered record of a clustering run.
#[derive(Debug, Clone)]
pub struct MergeLedger {
    num_items: usize,
    steps: Vec<MergeStep>,
    clamped: BitVec,
    clamp_log: Vec<ClampedBranch>,
}

impl MergeLedger {
    /// Ledger for a run over `num_items` items (2N−1 nodes).
    pub fn new(num_items: usize) -> Self {
        let num_nodes = (2 * num_items).saturating_sub(1);
        Self {
            num_items,
            steps: Vec::with_capacity(num_items.saturating_sub(1)),
            clamped: bitvec![0; num_nodes],
            clamp_log: Vec::new(),
        }
    }

    pub(crate) fn record_merge(&mut self, step: MergeStep) {
        self.steps.push(step);
    }

    /// Clamp `length` at zero, flagging `node` if it was negative.
    pub(crate) fn clamp(&mut self, node: NodeId, length: f64) -> f64 {
        if length >= 0.0 {
            return length;
        }
        if node.index() < self.clamped.len() {
            self.clamped.set(node.index(), true);
        }
        self.clamp_log.push(ClampedBranch {
            node,
            raw_length: length,
        });
        0.0
    }

    /// Merge steps in execution order.
    pub fn steps(&self) -> &[MergeStep] {
        &self.steps
    }

    /// Whether `node`'s branch was clamped.
    pub fn is_clamped(&self, node: NodeId) -> bool {
        self.clamped
            .get(node.index())
            .map(|bit| *bit)
            .unwrap_or(false)
    }

    /// Every clamp in the order it happened.
    pub fn clamped(&self) -> &[ClampedBranch] {
        &self.clamp_log
    }

    /// Number of clamped branches.
    pub fn clamped_count(&self) -> usize {
        self.clamp_log.len()
    }

    /// Whether any branch was clamped.
    pub fn any_clamped(&self) -> bool {
        !self.clamp_log.is_empty()
    }

    /// Verify all merges completed
    ///
    /// A binary tree over N leaves needs exactly N−1 joins.
    pub fn all_merges_complete(&self) -> bool {
        self.steps.len() == self.num_items.saturating_sub(1)
    }
}
