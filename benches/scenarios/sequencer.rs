//! Benchmarks for the full per-frame voice.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use drift_seq::{ControlInputs, EngineOutputs, SequencerConfig, StepSequencer};

use crate::BLOCK_SIZES;

pub fn bench_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/sequencer");
    let config = SequencerConfig {
        steps: 16,
        drift: 0.4,
        amplitude: 2.0,
        filter_value: 0.3,
        ..SequencerConfig::default()
    };

    for &size in BLOCK_SIZES {
        let mut outputs = vec![EngineOutputs::default(); size];

        // === STATIC CONTROLS ===
        // Clock edge every 32 frames, knobs untouched: caches always hit
        let clocked: Vec<ControlInputs> = (0..size)
            .map(|i| ControlInputs::gates(if i % 32 < 16 { 10.0 } else { 0.0 }, 0.0))
            .collect();
        let mut engine = StepSequencer::new(48_000.0);
        engine.set_config(config);

        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                engine.process_block(black_box(&clocked), black_box(&mut outputs));
            })
        });

        // === MOVING CV ===
        // Position and filter CV change every frame: both stages recompute
        let modulated: Vec<ControlInputs> = (0..size)
            .map(|i| {
                let lfo = (i as f32 / size as f32 * std::f32::consts::TAU).sin();
                ControlInputs {
                    position_cv: Some(5.0 + lfo * 4.0),
                    filter_cv: Some(5.0 + lfo * 5.0),
                    ..clocked[i]
                }
            })
            .collect();
        let mut engine = StepSequencer::new(48_000.0);
        engine.set_config(config);

        group.bench_with_input(BenchmarkId::new("moving_cv", size), &size, |b, _| {
            b.iter(|| {
                engine.process_block(black_box(&modulated), black_box(&mut outputs));
            })
        });
    }

    group.finish();
}
