//! Shared state types for UI communication
//!
//! Designed for real-time safety: static data is built once at init,
//! dynamic updates are allocation-free.

use drift_seq::{engine::Preference, DisplaySnapshot, EngineOutputs};

/// Manual parameters the UI can nudge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    BasePosition,
    Variance,
    Drift,
    DriftSpeed,
    Filter,
    Amplitude,
}

/// Commands sent from UI thread to audio thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    /// Start/stop the host clock
    ToggleClock,
    /// Change the host clock rate by a factor
    ScaleClock(f64),
    /// Send a reset gate to the sequencer
    Reset,
    /// Restore every parameter and preference to its default
    ModuleReset,
    /// Add or remove steps
    Steps(i32),
    /// Move the Euclidean rotation
    Offset(i32),
    /// Add a delta to a manual parameter
    Nudge(Param, f32),
    CycleDriftType,
    ToggleFilterType,
    CycleVoltageScale,
    TogglePreference(Preference),
}

/// Static state built once at initialization (can allocate)
#[derive(Clone)]
pub struct UiStateInit {
    /// Audio sample rate in Hz
    pub sample_rate: f32,
    /// Output channels of the monitor device
    pub channels: usize,
}

/// Dynamic state update sent from audio thread (allocation-free, Copy)
#[derive(Clone, Copy, Debug, Default)]
pub struct UiStateUpdate {
    /// Sequencer view
    pub snapshot: DisplaySnapshot,
    /// Lane voltages of the last processed frame
    pub outputs: EngineOutputs,
    /// Whether the host clock is running
    pub clock_running: bool,
    /// Host clock rate in Hz
    pub clock_hz: f64,
}
