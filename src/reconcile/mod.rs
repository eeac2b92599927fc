//! Leaf reconciliation
//!
//! Binds the leaves of a tree (typically one read from a file) to the items
//! currently loaded, and keeps that binding valid as items come and go.
//! Leaves that resolve to nothing get a synthetic placeholder item so the
//! tree stays complete.

mod matcher;

pub use matcher::{is_word_prefix_match, MatchKind, NameIndex, WORD_SEPARATORS};

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::item::Item;
use crate::tree::{NodeId, Tree};
use crate::Warning;

/// A leaf bound to a real item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafMatch {
    /// Leaf node.
    pub leaf: NodeId,
    /// How it was resolved. `None` when the leaf kept its existing item.
    pub kind: Option<MatchKind>,
}

/// A leaf left holding a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLeaf {
    /// Leaf node.
    pub node: NodeId,
    /// Name that failed to resolve.
    pub name: String,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Leaves bound to a real item.
    pub matched: Vec<LeafMatch>,
    /// Leaves holding a placeholder.
    pub unresolved: Vec<UnresolvedLeaf>,
    /// Leaves whose item was already claimed by an earlier leaf.
    pub one_to_many: usize,
}

impl ReconcileReport {
    /// Number of leaves resolved with `kind`.
    pub fn count_of(&self, kind: MatchKind) -> usize {
        self.matched
            .iter()
            .filter(|found| found.kind == Some(kind))
            .count()
    }

    /// Whether every leaf is bound to a real item.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Unresolved leaves reported as warnings.
    pub fn warnings(&self) -> Vec<Warning> {
        self.unresolved
            .iter()
            .map(|leaf| Warning::UnresolvedLeaf {
                node: leaf.node,
                name: leaf.name.clone(),
            })
            .collect()
    }
}

/// Bind every leaf of `tree` to an item from `items` by name.
///
/// Existing payloads are replaced. Unmatched leaves receive a placeholder
/// item carrying the leaf name.
#[instrument(level = "debug", skip_all, fields(items = items.len()))]
pub fn match_leaves_to_items(tree: &mut Tree, items: &[Arc<Item>]) -> ReconcileReport {
    let index = NameIndex::new(items);
    let mut pass = Pass::default();
    for leaf in tree.leaves() {
        pass.resolve(tree, leaf, &index, true);
    }
    pass.finish(tree)
}

/// Re-validate leaf bindings after `items` changed.
///
/// Leaves whose item is still present are left alone. The rest are matched
/// again by name; a leaf that still resolves to nothing keeps (or gains) a
/// placeholder.
#[instrument(level = "debug", skip_all, fields(items = items.len()))]
pub fn refresh(tree: &mut Tree, items: &[Arc<Item>]) -> ReconcileReport {
    let index = NameIndex::new(items);
    let mut pass = Pass::default();
    for leaf in tree.leaves() {
        let still_present = tree[leaf]
            .payload()
            .is_some_and(|item| !tree[leaf].is_placeholder() && index.contains(item));
        if still_present {
            pass.keep(tree, leaf);
        } else {
            pass.resolve(tree, leaf, &index, false);
        }
    }
    pass.finish(tree)
}

#[derive(Debug, Default)]
struct Pass {
    report: ReconcileReport,
    claimed: HashSet<usize>,
}

impl Pass {
    fn claim(&mut self, item: &Arc<Item>) {
        if !self.claimed.insert(Arc::as_ptr(item) as usize) {
            self.report.one_to_many += 1;
        }
    }

    fn keep(&mut self, tree: &Tree, leaf: NodeId) {
        if let Some(item) = tree[leaf].payload() {
            self.claim(item);
        }
        self.report.matched.push(LeafMatch { leaf, kind: None });
    }

    fn resolve(&mut self, tree: &mut Tree, leaf: NodeId, index: &NameIndex, replace: bool) {
        let name = tree[leaf].name().unwrap_or_default().to_string();
        match index.find(&name) {
            Some((item, kind)) => {
                let item = Arc::clone(item);
                self.claim(&item);
                let node = &mut tree[leaf];
                node.payload = Some(item);
                node.placeholder = false;
                self.report.matched.push(LeafMatch {
                    leaf,
                    kind: Some(kind),
                });
            }
            None => {
                let node = &mut tree[leaf];
                // keep an existing placeholder rather than minting another
                if replace || !node.placeholder || node.payload.is_none() {
                    node.payload = Some(Arc::new(Item::placeholder(name.as_str())));
                }
                node.placeholder = true;
                warn!(%leaf, name = %name, "no item matches leaf, using placeholder");
                self.report.unresolved.push(UnresolvedLeaf { node: leaf, name });
            }
        }
    }

    fn finish(self, tree: &Tree) -> ReconcileReport {
        debug!(
            leaves = tree.leaf_count(),
            matched = self.report.matched.len(),
            unresolved = self.report.unresolved.len(),
            one_to_many = self.report.one_to_many,
            "reconciled leaves"
        );
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::items_from_names;
    use crate::tree::TopologyBuilder;

    fn named_tree(names: &[&str]) -> Tree {
        let mut builder = TopologyBuilder::new();
        let mut nodes: Vec<NodeId> = names.iter().map(|name| builder.leaf(*name, 1.0)).collect();
        while nodes.len() > 1 {
            let right = nodes.remove(1);
            let left = nodes.remove(0);
            nodes.insert(0, builder.internal(left, right, 1.0));
        }
        builder.finish(nodes[0]).unwrap()
    }

    fn leaf_named(tree: &Tree, name: &str) -> NodeId {
        tree.leaves()
            .into_iter()
            .find(|&id| tree[id].name() == Some(name))
            .unwrap()
    }

    #[test]
    fn binds_matching_leaves_and_fills_gaps() {
        let mut tree = named_tree(&["a", "B", "c/1-10", "zz"]);
        let items = items_from_names(&["a", "b", "c"]);
        let report = match_leaves_to_items(&mut tree, &items);

        assert_eq!(report.matched.len(), 3);
        assert_eq!(report.count_of(MatchKind::Exact), 1);
        assert_eq!(report.count_of(MatchKind::CaseInsensitive), 1);
        assert_eq!(report.count_of(MatchKind::Prefix), 1);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].name, "zz");

        let zz = leaf_named(&tree, "zz");
        assert!(tree[zz].is_placeholder());
        assert!(tree[zz].payload().unwrap().has_placeholder_content());
        let c = leaf_named(&tree, "c/1-10");
        assert!(Arc::ptr_eq(tree[c].payload().unwrap(), &items[2]));
    }

    #[test]
    fn counts_leaves_sharing_an_item() {
        let mut tree = named_tree(&["x", "X", "x"]);
        let items = items_from_names(&["x"]);
        let report = match_leaves_to_items(&mut tree, &items);
        assert_eq!(report.one_to_many, 2);
        assert!(report.is_complete());
    }

    #[test]
    fn refresh_flips_placeholders_both_ways() {
        let mut tree = named_tree(&["a", "b"]);
        let items = items_from_names(&["a"]);
        match_leaves_to_items(&mut tree, &items);
        let b = leaf_named(&tree, "b");
        assert!(tree[b].is_placeholder());
        let first_placeholder = Arc::clone(tree[b].payload().unwrap());

        // still missing: same placeholder handle survives
        refresh(&mut tree, &items);
        assert!(Arc::ptr_eq(tree[b].payload().unwrap(), &first_placeholder));

        // item appears
        let mut grown = items.clone();
        grown.push(Arc::new(Item::named("b")));
        let report = refresh(&mut tree, &grown);
        assert!(report.is_complete());
        assert!(!tree[b].is_placeholder());
        assert!(Arc::ptr_eq(tree[b].payload().unwrap(), &grown[1]));

        // item removed again
        let a = leaf_named(&tree, "a");
        let report = refresh(&mut tree, &grown[1..]);
        assert_eq!(report.unresolved.len(), 1);
        assert!(tree[a].is_placeholder());
        assert!(!tree[b].is_placeholder());
        assert_eq!(report.matched, vec![LeafMatch { leaf: b, kind: None }]);
    }

    #[test]
    fn refresh_rebinds_replaced_items_by_name() {
        let mut tree = named_tree(&["a", "b"]);
        let items = items_from_names(&["a", "b"]);
        match_leaves_to_items(&mut tree, &items);

        let replacement = items_from_names(&["a", "b"]);
        let report = refresh(&mut tree, &replacement);
        assert_eq!(report.count_of(MatchKind::Exact), 2);
        for item in &replacement {
            assert!(tree.find_leaf_for_item(item).is_some());
        }
    }
}
