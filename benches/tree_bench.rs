//! Clustering benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phylo_cluster::*;

fn scrambled(size: usize) -> DistanceMatrix {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    DistanceMatrix::from_fn(size, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        1.0 + (state % 10_000) as f64 / 100.0
    })
    .expect("benchmark matrix is valid")
}

fn benchmark_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");
    for size in [16usize, 64, 128] {
        let names: Vec<String> = (0..size).map(|i| format!("seq{i}")).collect();
        let items = items_from_names(&names);
        let matrix = scrambled(size);
        for algorithm in [Algorithm::NeighborJoining, Algorithm::AverageLinkage] {
            let engine = ClusterEngine::new(algorithm);
            group.bench_with_input(
                BenchmarkId::new(algorithm.label(), size),
                &matrix,
                |b, matrix| {
                    b.iter(|| black_box(engine.build(&items, matrix.clone()).expect("build")));
                },
            );
        }
    }
    group.finish();
}

fn benchmark_reroot(c: &mut Criterion) {
    let names: Vec<String> = (0..128).map(|i| format!("seq{i}")).collect();
    let items = items_from_names(&names);
    let tree = build_tree(&items, scrambled(128), Algorithm::NeighborJoining).expect("build");
    let pivot = tree.find_max_distance_leaf(tree.root());

    c.bench_function("reroot_n=128", |b| {
        b.iter(|| {
            let mut copy = tree.clone();
            let root = copy.reroot(black_box(pivot)).expect("reroot");
            copy.compute_heights(root);
            copy.assign_layout_order(root);
            black_box(copy)
        });
    });
}

criterion_group!(benches, benchmark_clustering, benchmark_reroot);
criterion_main!(benches);
