//! Benchmarks for the ramp and mask stages, cache hit versus recompute.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use drift_seq::{
    dsp::NoiseField,
    sequencing::{
        filter::compute_mask, ramp::compute_ramp, FilterType, MaskCache, MaskKey, RampCache,
        RampKey,
    },
    MAX_STEPS,
};

pub fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/stages");
    let noise = NoiseField::default();

    for &steps in &[4usize, 8, MAX_STEPS] {
        let key = RampKey {
            steps,
            base_position: 3.0,
            variance: 4.0,
            invert: false,
        };

        group.bench_with_input(BenchmarkId::new("ramp_compute", steps), &steps, |b, _| {
            b.iter(|| black_box(compute_ramp(black_box(&noise), black_box(&key))))
        });

        let mut cache = RampCache::new();
        cache.refresh(&noise, key);
        group.bench_with_input(BenchmarkId::new("ramp_cache_hit", steps), &steps, |b, _| {
            b.iter(|| black_box(cache.refresh(black_box(&noise), black_box(key))))
        });

        let ramp = compute_ramp(&noise, &key);
        for filter_type in [FilterType::Euclidean, FilterType::NoiseThreshold] {
            let mask_key = MaskKey {
                filter_type,
                filter_value: 0.35,
                filter_offset: 1,
                ramp_generation: 1,
            };
            let name = format!("mask_compute_{}", filter_type.label().to_lowercase());
            group.bench_with_input(BenchmarkId::new(name, steps), &steps, |b, _| {
                b.iter(|| black_box(compute_mask(black_box(&ramp), black_box(&mask_key))))
            });

            let mut cache = MaskCache::new();
            cache.refresh(&ramp, mask_key);
            let name = format!("mask_cache_hit_{}", filter_type.label().to_lowercase());
            group.bench_with_input(BenchmarkId::new(name, steps), &steps, |b, _| {
                b.iter(|| black_box(cache.refresh(black_box(&ramp), black_box(mask_key))))
            });
        }
    }

    group.finish();
}
