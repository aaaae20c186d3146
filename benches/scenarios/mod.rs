//! Whole-voice benchmarks.
//!
//! These drive the sequencer the way a host does: one call per frame,
//! a clock on the trigger input, optionally with CVs moving every frame.

mod sequencer;

pub use sequencer::bench_sequencer;
