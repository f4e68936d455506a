//! Criterion benchmarks for mesh construction and point queries.
//! Precision factors: {1e2, 1e4, 1e6} on a smooth oscillating surface.
//! Results live under target/criterion.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use quadspline::{build_mesh, Rect};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn surface(x: f64, y: f64) -> f64 {
    2.0 + (3.0 * x).sin() * (2.0 * y).cos()
}

fn domain() -> Rect {
    Rect::new(0.0, 0.0, 2.0, 2.0).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_build");
    for &pf in &[1e2, 1e4, 1e6] {
        group.bench_with_input(BenchmarkId::new("build_mesh", pf), &pf, |b, &pf| {
            b.iter(|| build_mesh(&surface, domain(), pf).unwrap())
        });
    }
    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_locate");
    let mut rng = StdRng::seed_from_u64(11);
    let points: Vec<(f64, f64)> = (0..1024)
        .map(|_| (rng.gen_range(0.0..2.0), rng.gen_range(0.0..2.0)))
        .collect();
    for &pf in &[1e2, 1e4, 1e6] {
        let mesh = build_mesh(&surface, domain(), pf).unwrap();
        group.bench_with_input(BenchmarkId::new("evaluate_1024", pf), &mesh, |b, mesh| {
            b.iter(|| points.iter().map(|&(x, y)| mesh.evaluate(x, y)).sum::<f64>())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_locate);
criterion_main!(benches);
