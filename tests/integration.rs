//! End-to-end builds through the orchestrator.

mod common;

use common::*;
use phylo_cluster::*;
use test_case::test_case;

#[test_case(Algorithm::NeighborJoining ; "neighbor joining")]
#[test_case(Algorithm::AverageLinkage ; "average linkage")]
fn builds_from_model_distances(algorithm: Algorithm) {
    init_tracing();
    let items = vec![
        sequence("human", "ACGTACGTACGTACGT"),
        sequence("chimp", "ACGTACGTACGTACGA"),
        sequence("mouse", "ACGAACGTTCGTACCA"),
        sequence("rat", "ACGAACGTTCGAACCT"),
        sequence("fly", "TCGATCGTTGGAAGCA"),
    ];
    let outcome = TreeBuilder::new(BuildConfig::new(algorithm))
        .run_with_model(&items, &PercentIdentity)
        .expect("build succeeds");

    let tree = &outcome.tree;
    assert_eq!(tree.leaf_count(), 5);
    assert!(outcome.ledger.all_merges_complete());

    // the closest pair is joined first
    let first = &outcome.ledger.steps()[0];
    let mut pair = [
        items[first.kept_slot].name(),
        items[first.absorbed_slot].name(),
    ];
    pair.sort_unstable();
    assert_eq!(pair, ["chimp", "human"]);

    for item in &items {
        assert!(tree.find_leaf_for_item(item).is_some());
    }
}

#[test_case("NJ", Algorithm::NeighborJoining ; "nj")]
#[test_case("AV", Algorithm::AverageLinkage ; "av")]
#[test_case("upgma", Algorithm::AverageLinkage ; "upgma")]
fn selectors_choose_algorithm(selector: &str, expected: Algorithm) {
    let config = BuildConfig::from_selector(selector).expect("known selector");
    assert_eq!(config.algorithm, expected);
}

#[test]
fn reroot_option_moves_root_to_longest_leaf_branch() {
    init_tracing();
    let items = items_from_names(&["A", "B", "C", "D"]);
    let plain = TreeBuilder::new(BuildConfig::neighbor_joining())
        .run(&items, additive_four())
        .expect("build succeeds");
    let rerooted = TreeBuilder::new(BuildConfig::neighbor_joining().with_reroot_at_max_distance(true))
        .run(&items, additive_four())
        .expect("build succeeds");

    // B has the longest leaf branch (3) in the unrooted tree
    let pivot = rerooted.rerooted_at.expect("reroot requested");
    assert_eq!(rerooted.tree[pivot].name(), Some("B"));
    let root = rerooted.tree.root();
    assert_eq!(rerooted.tree[root].children().map(|(_, right)| right), Some(pivot));
    assert_close(rerooted.tree[pivot].branch_length, 1.5, 1e-9);
    assert_close(
        rerooted.tree.total_length(),
        plain.tree.total_length(),
        1e-9,
    );
    assert_eq!(rerooted.tree[root].count, 4);
    assert_ne!(plain.tree.fingerprint(), rerooted.tree.fingerprint());
}

#[test]
fn threshold_grouping_splits_distant_clades() {
    let items = items_from_names(&["a1", "a2", "b1", "b2"]);
    let distances = matrix(&[
        &[0.0, 1.0, 10.0, 10.0],
        &[1.0, 0.0, 10.0, 10.0],
        &[10.0, 10.0, 0.0, 1.0],
        &[10.0, 10.0, 1.0, 0.0],
    ]);
    let outcome = TreeBuilder::new(BuildConfig::average_linkage())
        .run(&items, distances)
        .expect("build succeeds");
    let tree = &outcome.tree;

    // clades sit at height 4.5 of 5; leaves at 5
    let groups = tree.find_clusters(0.5);
    assert_eq!(groups.len(), 2);
    let mut clades: Vec<Vec<&str>> = groups
        .iter()
        .map(|&group| {
            let mut names: Vec<&str> = tree
                .leaves_under(group)
                .into_iter()
                .filter_map(|leaf| tree[leaf].name())
                .collect();
            names.sort_unstable();
            names
        })
        .collect();
    clades.sort();
    assert_eq!(clades, vec![vec!["a1", "a2"], vec!["b1", "b2"]]);
    assert_eq!(tree.find_clusters(0.95).len(), 4);
}

#[test]
fn apply_to_all_nodes_visits_each_node_once() {
    let items = items_from_names(&["a", "b", "c", "d", "e"]);
    let mut tree = TreeBuilder::new(BuildConfig::neighbor_joining())
        .run(&items, scrambled_matrix(5, 7))
        .expect("build succeeds")
        .tree;
    let mut visited = Vec::new();
    tree.apply_to_all_nodes(|id, node| {
        visited.push(id);
        node.bootstrap = Some(100);
    });
    visited.sort();
    visited.dedup();
    assert_eq!(visited.len(), tree.len());
    assert!(tree.leaves().iter().all(|&leaf| tree[leaf].bootstrap == Some(100)));
}

#[test]
fn single_item_yields_single_leaf() {
    let items = items_from_names(&["only"]);
    let outcome = TreeBuilder::new(BuildConfig::average_linkage().with_reroot_at_max_distance(true))
        .run(&items, DistanceMatrix::zeros(1))
        .expect("build succeeds");
    assert_eq!(outcome.tree.len(), 1);
    assert_eq!(outcome.tree.leaf_names(), vec!["only"]);
    assert_eq!(outcome.rerooted_at, Some(outcome.tree.root()));
}

#[test]
fn mismatched_matrix_is_rejected() {
    let items = items_from_names(&["a", "b", "c"]);
    let err = TreeBuilder::new(BuildConfig::default())
        .run(&items, DistanceMatrix::zeros(2))
        .expect_err("size mismatch");
    assert_eq!(
        err,
        TreeError::InvalidInput(InputError::DimensionMismatch { size: 2, items: 3 })
    );
}
