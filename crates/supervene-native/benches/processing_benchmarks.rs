//! Benchmarks for simulation and signal processing

use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;

use supervene_core::life::{random_grid, step};
use supervene_core::{prepare_pairs, ButterworthHighpass, GameOfLife};

/// Synthetic 1 kHz ECoG-like trace: slow drift plus a 12 Hz rhythm
fn generate_ecog_samples(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| {
        let t = i as f64 / 1000.0;
        let rhythm = (2.0 * PI * 12.0 * t).sin();
        let noise = (i as f64 * 0.123).sin() * 0.1; // Pseudo-noise
        (rhythm + noise + 0.5 * t) * 50.0
    })
}

fn bench_life_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("life_step");

    for size in [15, 64, 256].iter() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = random_grid(*size, &mut rng);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(step(black_box(grid.view()))));
        });
    }

    group.finish();
}

fn bench_life_simulation(c: &mut Criterion) {
    let simulator = GameOfLife::new(15, 100).expect("valid simulator");

    c.bench_function("life_simulate_15x15x100", |b| {
        b.iter(|| black_box(simulator.simulate(black_box(7))));
    });
}

fn bench_filtfilt(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtfilt");
    let filter = ButterworthHighpass::new(5, 1.0, 1000.0).expect("valid filter");

    for size in [1_000, 10_000, 100_000].iter() {
        let samples = generate_ecog_samples(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(filter.filtfilt(black_box(samples.view()))));
        });
    }

    group.finish();
}

fn bench_prepare_pairs(c: &mut Criterion) {
    let sequence = GameOfLife::new(15, 100).expect("valid simulator").simulate(1).into_dyn();

    c.bench_function("prepare_pairs_100x15x15", |b| {
        b.iter(|| black_box(prepare_pairs(black_box(&sequence))));
    });
}

criterion_group!(
    benches,
    bench_life_step,
    bench_life_simulation,
    bench_filtfilt,
    bench_prepare_pairs,
);

criterion_main!(benches);
