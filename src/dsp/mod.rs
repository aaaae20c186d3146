//! Low-level DSP primitives used by the sequencer voice.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! call once per audio frame. They stay focused on the signal math so the
//! engine can layer orchestration (caching, stepping, lane routing) on top.

/// Fold-back limiting and voltage-range rescaling.
pub mod distortion;
/// Slow phase accumulator that drives per-step drift.
pub mod drift;
/// Seeded coherent noise field.
pub mod noise;
/// Schmitt-trigger edge detection and one-shot pulses.
pub mod trigger;

pub use drift::{DriftOscillator, DriftType};
pub use noise::NoiseField;
pub use trigger::{PulseGenerator, SchmittState, SchmittTrigger};
