//! Benchmarks for relation discovery and the individual tests.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use statquest::prelude::*;

/// Seeded random column; `kind` selects the scale.
fn synthetic(name: &str, rows: usize, seed: u64, kind: usize) -> Arc<Observable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..rows).map(|row| {
        let value = match kind % 3 {
            0 => Value::Int(rng.random_range(0..7)),
            1 => Value::Float(rng.random_range(0.0..100.0)),
            _ => Value::Text(format!("level-{}", rng.random_range(0..4))),
        };
        (row, value)
    });
    Arc::new(Observable::new(name, data).unwrap())
}

fn pool(observables: usize, rows: usize) -> Vec<Arc<Observable>> {
    (0..observables)
        .map(|i| synthetic(&format!("obs{i:03}"), rows, i as u64, i))
        .collect()
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let engine = DiscoveryEngine::new(TestSuite::all(), DiscoveryConfig::default());
    for observables in [5, 10, 20] {
        let pool = pool(observables, 200);
        group.bench_with_input(
            BenchmarkId::new("all_tests", observables),
            &pool,
            |b, pool| b.iter(|| engine.discover(black_box(pool)).unwrap()),
        );
    }
    group.finish();
}

fn bench_tests(c: &mut Criterion) {
    let mut group = c.benchmark_group("tests");

    let ordinal = synthetic("ordinal", 1_000, 1, 0);
    let continuous = synthetic("continuous", 1_000, 2, 1);
    let nominal = synthetic("nominal", 1_000, 3, 2);

    let cases = [
        (StatisticalTest::ChiSquare, &ordinal, &nominal),
        (StatisticalTest::KruskalWallis, &nominal, &continuous),
        (StatisticalTest::Pearson, &ordinal, &continuous),
        (StatisticalTest::Spearman, &ordinal, &continuous),
        (StatisticalTest::Kendall, &ordinal, &continuous),
    ];
    for (test, a, b) in cases {
        group.bench_function(test.id(), |bench| {
            bench.iter(|| test.apply(black_box(a), black_box(b)).unwrap())
        });
    }

    // exact permutation distribution versus the normal approximation
    for rows in [20, 33, 34, 200] {
        let x = synthetic("x", rows, 11, 1);
        let y = synthetic("y", rows, 12, 1);
        group.bench_with_input(BenchmarkId::new("kendall_rows", rows), &rows, |bench, _| {
            bench.iter(|| StatisticalTest::Kendall.apply(black_box(&x), black_box(&y)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_discovery, bench_tests);
criterion_main!(benches);
