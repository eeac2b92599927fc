//! Linkage strategies
//!
//! Selection score, branch-length split and distance update for the two
//! supported algorithms. The strategy is chosen once per build and matched
//! on in the inner loops; nothing here touches the tree.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use super::ClusterSet;
use crate::matrix::{DistanceMatrix, InputError};

/// Agglomeration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Algorithm {
    /// Neighbor-Joining: divergence-corrected pair selection.
    #[default]
    NeighborJoining,

    /// Average linkage (UPGMA): closest pair, size-weighted averaging.
    AverageLinkage,
}

impl Algorithm {
    /// Short selector string ("NJ" / "AV").
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::NeighborJoining => "NJ",
            Algorithm::AverageLinkage => "AV",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Algorithm {
    type Err = InputError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "nj" | "neighbor-joining" | "neighbour-joining" | "neighborjoining" => {
                Ok(Algorithm::NeighborJoining)
            }
            "av" | "avg" | "average" | "average-linkage" | "upgma" => {
                Ok(Algorithm::AverageLinkage)
            }
            _ => Err(InputError::UnknownAlgorithm(selector.to_string())),
        }
    }
}

/// Pair chosen for the next merge. Pairs found by the selection scan have
/// `kept < absorbed`; the final join of the last two clusters reverses that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Selection {
    pub kept: usize,
    pub absorbed: usize,
    pub score: f64,
}

/// Row sums over active columns, zero for retired slots.
pub(crate) fn active_row_sums(matrix: &DistanceMatrix, clusters: &ClusterSet) -> Vec<f64> {
    let mut sums = vec![0.0; clusters.capacity()];
    for k in clusters.active_slots() {
        sums[k] = clusters.active_slots().map(|m| matrix.get(k, m)).sum();
    }
    sums
}

/// Divergence `r(k, x)`: distance from `k` to every active cluster other
/// than `k` and `x`, averaged over `active − 2` while more than two
/// clusters remain.
#[inline]
pub(crate) fn divergence(row_sum: f64, to_partner: f64, active: usize) -> f64 {
    let sum = row_sum - to_partner;
    if active > 2 {
        sum / (active - 2) as f64
    } else {
        sum
    }
}

impl Algorithm {
    /// Scan active pairs in ascending `(i, j)` order; the first minimum wins.
    pub(crate) fn select_pair(
        self,
        matrix: &DistanceMatrix,
        clusters: &ClusterSet,
    ) -> Option<Selection> {
        let active = clusters.active_count();
        let row_sums = match self {
            Algorithm::NeighborJoining => active_row_sums(matrix, clusters),
            Algorithm::AverageLinkage => Vec::new(),
        };

        let slots: Vec<usize> = clusters.active_slots().collect();
        let mut best: Option<Selection> = None;
        for (pos, &i) in slots.iter().enumerate() {
            for &j in &slots[pos + 1..] {
                let distance = matrix.get(i, j);
                let score = match self {
                    Algorithm::AverageLinkage => distance,
                    Algorithm::NeighborJoining => {
                        let ri = divergence(row_sums[i], distance, active);
                        let rj = divergence(row_sums[j], distance, active);
                        distance - (ri + rj)
                    }
                };
                trace!(i, j, score, "pair score");
                if best.map_or(true, |current| score < current.score) {
                    best = Some(Selection {
                        kept: i,
                        absorbed: j,
                        score,
                    });
                }
            }
        }
        best
    }

    /// New distances from the merged cluster (at `kept`) to every other
    /// active slot.
    pub(crate) fn updated_distances(
        self,
        matrix: &DistanceMatrix,
        clusters: &ClusterSet,
        kept: usize,
        absorbed: usize,
    ) -> Vec<(usize, f64)> {
        let size_kept = clusters.size(kept) as f64;
        let size_absorbed = clusters.size(absorbed) as f64;
        let joined = matrix.get(kept, absorbed);

        clusters
            .active_slots()
            .filter(|&l| l != kept && l != absorbed)
            .map(|l| {
                let to_kept = matrix.get(kept, l);
                let to_absorbed = matrix.get(absorbed, l);
                let value = match self {
                    Algorithm::AverageLinkage => {
                        (to_kept * size_kept + to_absorbed * size_absorbed)
                            / (size_kept + size_absorbed)
                    }
                    Algorithm::NeighborJoining => (to_kept + to_absorbed - joined) / 2.0,
                };
                (l, value)
            })
            .collect()
    }
}

/// NJ split: `b_i = (d + r_i − r_j) / 2`, `b_j = d − b_i` (unclamped).
pub(crate) fn neighbor_joining_branches(distance: f64, ri: f64, rj: f64) -> (f64, f64) {
    let bi = (distance + ri - rj) / 2.0;
    (bi, distance - bi)
}

/// Average-linkage split: each child sits at half the merge distance minus
/// the depth already accumulated below it (unclamped).
pub(crate) fn average_linkage_branches(distance: f64, depth_i: f64, depth_j: f64) -> (f64, f64) {
    let half = distance / 2.0;
    (half - depth_i, half - depth_j)
}
