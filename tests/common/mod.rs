#![allow(dead_code)]

use std::sync::Arc;

use phylo_cluster::{DistanceMatrix, Item, NodeId, Tree};
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn matrix(rows: &[&[f64]]) -> DistanceMatrix {
    DistanceMatrix::from_rows(rows.iter().map(|row| row.to_vec()).collect())
        .expect("fixture matrix is valid")
}

/// Path lengths on the tree A:2, B:3 | C:1, D:5 joined by an edge of 4.
pub fn additive_four() -> DistanceMatrix {
    matrix(&[
        &[0.0, 5.0, 7.0, 11.0],
        &[5.0, 0.0, 8.0, 12.0],
        &[7.0, 8.0, 0.0, 6.0],
        &[11.0, 12.0, 6.0, 0.0],
    ])
}

/// Deterministic pseudo-random matrix with entries in `[1, 100)`.
pub fn scrambled_matrix(size: usize, seed: u64) -> DistanceMatrix {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    DistanceMatrix::from_fn(size, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        1.0 + ((state >> 33) % 9900) as f64 / 100.0
    })
    .expect("generated entries are valid")
}

pub fn sequence(name: &str, residues: &str) -> Arc<Item> {
    Arc::new(Item::new(name, residues.as_bytes().to_vec()))
}

pub fn leaf_named(tree: &Tree, name: &str) -> NodeId {
    tree.leaves()
        .into_iter()
        .find(|&id| tree[id].name() == Some(name))
        .unwrap_or_else(|| panic!("no leaf named {name}"))
}

pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {expected}, got {actual} (eps {eps})"
    );
}

/// Sum of branch lengths from `node` up to (excluding) the root.
pub fn path_length(tree: &Tree, node: NodeId) -> f64 {
    let mut total = 0.0;
    let mut current = node;
    while let Some(parent) = tree[current].parent() {
        total += tree[current].branch_length;
        current = parent;
    }
    total
}
