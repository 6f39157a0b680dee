//! Micro benchmarks for traversal-order planning.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use trellis::{
    build_expressions, order_expressions, AlgebraicExpr, PatternEdge, PatternGraph, PlannerConfig,
};

/// Chain pattern `(n0:L0)-[r0]->(n1)-...->(nk)` with a label on each end.
fn chain(len: usize) -> (PatternGraph, Vec<AlgebraicExpr>) {
    let mut graph = PatternGraph::new();
    for i in 0..=len {
        let label = (i == 0 || i == len).then(|| format!("L{i}"));
        graph.add_node(format!("n{i}"), label).unwrap();
    }
    for i in 0..len {
        graph
            .add_edge(
                PatternEdge::between(format!("n{i}"), format!("n{}", i + 1))
                    .alias(format!("r{i}")),
            )
            .unwrap();
    }
    let exps = build_expressions(&graph).unwrap();
    (graph, exps)
}

fn planner_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner/order_expressions");
    group.sample_size(30);

    for &len in &[3usize, 5, 7] {
        let (graph, exps) = chain(len);
        group.bench_function(BenchmarkId::from_parameter(len), |b| {
            b.iter_batched(
                || exps.clone(),
                |mut exps| {
                    order_expressions(
                        &graph,
                        &mut exps,
                        None,
                        None,
                        &PlannerConfig::default(),
                    );
                    black_box(exps);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, planner_benches);
criterion_main!(benches);
