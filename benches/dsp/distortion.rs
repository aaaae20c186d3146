//! Benchmarks for fold-back limiting.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use drift_seq::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Mostly in range, as the lanes usually are
        let gentle: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin() * 4.0).collect();
        // Far out of range, several folds deep
        let hot: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin() * 60.0).collect();

        let mut buffer = gentle.clone();
        group.bench_with_input(BenchmarkId::new("foldback_in_range", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&gentle);
                for sample in buffer.iter_mut() {
                    *sample = distortion::foldback(black_box(*sample), black_box(5.0));
                }
                black_box(&buffer);
            })
        });

        let mut buffer = hot.clone();
        group.bench_with_input(BenchmarkId::new("foldback_hot", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&hot);
                for sample in buffer.iter_mut() {
                    *sample = distortion::foldback(black_box(*sample), black_box(5.0));
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
