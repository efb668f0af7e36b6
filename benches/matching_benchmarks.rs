//! Benchmarks for pose normalization and matching

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use handtyped::{
    binding::GestureBinding,
    matcher::{pose_diff, PoseMatcher},
    normalizer::{normalize, normalize_with, NormalizeOptions},
    pose::{Landmark, Pose},
};

fn random_hand() -> Pose {
    (0..21)
        .map(|_| Landmark::with_depth(rand::random::<f64>(), rand::random::<f64>(), rand::random::<f64>() * 0.1))
        .collect()
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let hand = random_hand();

    group.bench_function("depth", |b| {
        b.iter(|| black_box(normalize_with(black_box(&hand), NormalizeOptions { use_depth: true })));
    });
    group.bench_function("flat", |b| {
        b.iter(|| black_box(normalize_with(black_box(&hand), NormalizeOptions::default())));
    });

    group.finish();
}

fn benchmark_pose_diff(c: &mut Criterion) {
    let a = normalize(&random_hand());
    let b = normalize(&random_hand());

    c.bench_function("pose_diff", |bench| {
        bench.iter(|| black_box(pose_diff(black_box(&a), black_box(&b))));
    });
}

fn benchmark_best_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_match");
    let matcher = PoseMatcher::default();
    let live = normalize(&random_hand());

    for count in [1, 10, 50, 200] {
        let bindings: Vec<GestureBinding> = (0..count)
            .map(|i| GestureBinding::new(format!("gesture_{i}"), "a", normalize(&random_hand())))
            .collect();

        group.bench_with_input(BenchmarkId::new("bindings", count), &bindings, |b, bindings| {
            b.iter(|| black_box(matcher.best_match_with_distance(black_box(&live), bindings)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_normalize, benchmark_pose_diff, benchmark_best_match);
criterion_main!(benches);
