//! Partition of item indices into the clusters still open for merging.
//!
//! Slot `i` is valid if and only if bit `i` of `merged` is clear. The
//! cluster living at a valid slot is never empty.

use bitvec::prelude::*;

/// Active clusters keyed by matrix slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSet {
    members: Vec<Vec<usize>>,
    merged: BitVec,
    active: usize,
}

impl ClusterSet {
    /// One singleton cluster per item.
    pub fn singletons(num_items: usize) -> Self {
        Self {
            members: (0..num_items).map(|index| vec![index]).collect(),
            merged: bitvec![0; num_items],
            active: num_items,
        }
    }

    /// Number of slots (original items).
    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    /// Number of clusters still active.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Whether `slot` still holds a cluster.
    #[inline]
    pub fn is_active(&self, slot: usize) -> bool {
        !self.merged[slot]
    }

    /// Active slots in ascending order.
    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.merged.iter_zeros()
    }

    /// Original indices merged into the cluster at `slot` (empty once the
    /// slot has been absorbed).
    pub fn members(&self, slot: usize) -> &[usize] {
        &self.members[slot]
    }

    /// Size of the cluster at `slot`.
    pub fn size(&self, slot: usize) -> usize {
        self.members[slot].len()
    }

    /// Move the members of `absorbed` into `kept` and retire `absorbed`.
    pub(crate) fn merge(&mut self, kept: usize, absorbed: usize) {
        debug_assert!(kept != absorbed, "cannot merge a slot with itself");
        debug_assert!(self.is_active(kept) && self.is_active(absorbed));

        let moved = std::mem::take(&mut self.members[absorbed]);
        self.members[kept].extend(moved);
        self.merged.set(absorbed, true);
        self.active -= 1;
    }
}
