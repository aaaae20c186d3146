//! Benchmarks for the coherent noise field.

use std::hint::black_box;

use criterion::Criterion;
use drift_seq::dsp::{noise::DEFAULT_SEED, NoiseField};

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    let field = NoiseField::new(DEFAULT_SEED);

    group.bench_function("evaluate", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.013;
            black_box(field.evaluate(black_box(x), black_box(1.7), black_box(10.0)))
        })
    });

    group.bench_function("new", |b| {
        b.iter(|| black_box(NoiseField::new(black_box(DEFAULT_SEED))))
    });

    group.finish();
}
