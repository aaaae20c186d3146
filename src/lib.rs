pub mod dsp; // Noise, edge detection, drift and folding primitives
pub mod engine; // The sequencer voice and its host-facing types
pub mod sequencing; // Memoized ramp and pattern-mask stages

pub use engine::{
    ControlInputs, DisplaySnapshot, EngineOutputs, Preferences, SequencerConfig, StepSequencer,
};

/// Capacity of every per-step array. Only the first `steps` entries are live.
pub const MAX_STEPS: usize = 16;
pub const MIN_STEPS: usize = 2;

/// Sample rate the drift increment is calibrated against.
pub const REFERENCE_SAMPLE_RATE: f32 = 44_100.0;

/// Voltage written to a trigger lane while its pulse is high.
pub const TRIGGER_VOLTAGE: f32 = 10.0;

/// Bipolar limit of the fold-back stage.
pub const FOLD_LIMIT: f32 = 5.0;
