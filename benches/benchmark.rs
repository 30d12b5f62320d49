// Performance benchmarks for graphx analytics on seeded random graphs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use graphx::prelude::*;
use rand::prelude::*;

const SEED: u64 = 0x6772_6170_6878;

fn generate_random_graph(nodes: usize, avg_degree: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(false, true);
    for i in 0..nodes {
        graph.add_node(format!("n{}", i));
    }
    for _ in 0..nodes * avg_degree / 2 {
        let a = rng.random_range(0..nodes);
        let b = rng.random_range(0..nodes);
        graph.add_edge(format!("n{}", a), format!("n{}", b), rng.random_range(0.1..10.0));
    }
    graph
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("graphx", size), size, |b, &size| {
            b.iter(|| black_box(generate_random_graph(size, 8, SEED)));
        });
    }

    group.finish();
}

fn benchmark_pagerank(c: &mut Criterion) {
    let mut group = c.benchmark_group("pagerank");

    for size in [1_000, 10_000].iter() {
        let graph = generate_random_graph(*size, 8, SEED);
        group.bench_with_input(BenchmarkId::new("graphx", size), &graph, |b, graph| {
            b.iter(|| black_box(PageRank::new(graph).compute()));
        });
    }

    group.finish();
}

fn benchmark_communities(c: &mut Criterion) {
    let mut group = c.benchmark_group("communities");
    group.sample_size(20);

    for size in [500, 5_000].iter() {
        let graph = generate_random_graph(*size, 8, SEED);
        let config = CommunityConfig::new().with_seed(SEED);
        group.bench_with_input(BenchmarkId::new("graphx", size), &graph, |b, graph| {
            b.iter(|| {
                let detection = CommunityDetection::with_config(graph, config.clone()).unwrap();
                black_box(detection.detect())
            });
        });
    }

    group.finish();
}

fn benchmark_dijkstra(c: &mut Criterion) {
    let mut group = c.benchmark_group("dijkstra");

    let graph = generate_random_graph(10_000, 8, SEED);
    let search = ShortestPath::new(&graph);

    group.bench_function("graphx_dijkstra", |b| {
        b.iter(|| black_box(search.dijkstra(black_box("n0")).unwrap()));
    });
    group.bench_function("graphx_bfs", |b| {
        b.iter(|| black_box(search.bfs(black_box("n0")).unwrap()));
    });

    group.finish();
}

fn benchmark_jaccard(c: &mut Criterion) {
    let mut group = c.benchmark_group("jaccard");

    let graph = generate_random_graph(500, 8, SEED);
    let jaccard = JaccardSimilarity::new(&graph);

    group.bench_function("graphx_all_pairs", |b| {
        b.iter(|| black_box(jaccard.pairs(true)));
    });
    group.bench_function("graphx_single_pair", |b| {
        b.iter(|| black_box(jaccard.compute(black_box("n1"), black_box("n2"))));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_build,
    benchmark_pagerank,
    benchmark_communities,
    benchmark_dijkstra,
    benchmark_jaccard
);
criterion_main!(benches);
