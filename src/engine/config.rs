//! Manual parameters, per-sample host inputs and their resolution.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{distortion::rescale, DriftType},
    sequencing::{filter::apply_deadzone, FilterType},
    FOLD_LIMIT, MAX_STEPS, MIN_STEPS,
};

pub const MIN_POSITION: f32 = 1.0;
pub const MAX_POSITION: f32 = 10.0;
pub const MIN_VARIANCE: f32 = 1.0;
pub const MAX_VARIANCE: f32 = 10.0;
pub const MAX_AMPLITUDE: f32 = 5.0;

/// Output voltage range of the CV lanes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoltageScale {
    /// -5 V to +5 V (no remap)
    #[default]
    Bipolar5V,
    /// 0 V to +10 V
    Unipolar10V,
    /// 0 V to +5 V
    Unipolar5V,
}

impl VoltageScale {
    /// Remap a folded ±5 V value into this range.
    #[inline]
    pub fn apply(self, volts: f32) -> f32 {
        match self {
            VoltageScale::Bipolar5V => volts,
            VoltageScale::Unipolar10V => rescale(volts, -FOLD_LIMIT, FOLD_LIMIT, 0.0, 10.0),
            VoltageScale::Unipolar5V => rescale(volts, -FOLD_LIMIT, FOLD_LIMIT, 0.0, 5.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoltageScale::Bipolar5V => "-5V..+5V",
            VoltageScale::Unipolar10V => "0V..+10V",
            VoltageScale::Unipolar5V => "0V..+5V",
        }
    }

    pub fn next(self) -> Self {
        match self {
            VoltageScale::Bipolar5V => VoltageScale::Unipolar10V,
            VoltageScale::Unipolar10V => VoltageScale::Unipolar5V,
            VoltageScale::Unipolar5V => VoltageScale::Bipolar5V,
        }
    }
}

/// Manual parameter values (the knobs and switches).
///
/// Values outside their ranges are accepted and clamped when resolved.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerConfig {
    /// Number of steps (2..=16)
    pub steps: usize,
    /// Where the ramp circle sits in the noise field (1..=10)
    pub base_position: f32,
    /// Variance knob (1..=10); the ramp radius uses 2^variance
    pub variance: f32,
    /// Drift amount (-1..=1)
    pub drift: f32,
    pub drift_type: DriftType,
    /// Drift speed multiplier (1..=10)
    pub drift_speed: f32,
    pub filter_type: FilterType,
    /// Filter control (-1..=1)
    pub filter_value: f32,
    /// Euclidean rotation (0..steps)
    pub filter_offset: usize,
    /// Output gain (0..=5)
    pub amplitude: f32,
    pub voltage_scale: VoltageScale,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            steps: 8,
            base_position: 1.0,
            variance: 1.0,
            drift: 0.0,
            drift_type: DriftType::Sphere,
            drift_speed: 1.0,
            filter_type: FilterType::Euclidean,
            filter_value: 0.0,
            filter_offset: 0,
            amplitude: 0.0,
            voltage_scale: VoltageScale::Bipolar5V,
        }
    }
}

impl SequencerConfig {
    /// Copy with every field clamped to its documented range.
    pub fn clamped(&self) -> Self {
        let steps = self.steps.clamp(MIN_STEPS, MAX_STEPS);
        Self {
            steps,
            base_position: clamp_or_low(self.base_position, MIN_POSITION, MAX_POSITION),
            variance: clamp_or_low(self.variance, MIN_VARIANCE, MAX_VARIANCE),
            drift: clamp_or_low(self.drift, -1.0, 1.0),
            drift_type: self.drift_type,
            drift_speed: clamp_or_low(self.drift_speed, 1.0, 10.0),
            filter_type: self.filter_type,
            filter_value: clamp_or_low(self.filter_value, -1.0, 1.0),
            filter_offset: self.filter_offset.min(steps - 1),
            amplitude: clamp_or_low(self.amplitude, 0.0, MAX_AMPLITUDE),
            voltage_scale: self.voltage_scale,
        }
    }

    /// Let connected control voltages override their manual parameters.
    ///
    /// Overridden values are written back so the parameter follows the CV.
    pub fn apply_cv(&mut self, inputs: &ControlInputs) {
        if let Some(v) = inputs.position_cv {
            self.base_position = clamp_or_low(v, MIN_POSITION, MAX_POSITION);
        }
        if let Some(v) = inputs.variance_cv {
            self.variance = clamp_or_low(v, MIN_VARIANCE, MAX_VARIANCE);
        }
        if let Some(v) = inputs.drift_cv {
            self.drift = clamp_or_low(rescale(v, 0.0, 10.0, -1.0, 1.0), -1.0, 1.0);
        }
        if let Some(v) = inputs.amplitude_cv {
            let amplitude = rescale(v, 0.0, 10.0, 0.0, MAX_AMPLITUDE);
            self.amplitude = clamp_or_low(amplitude, 0.0, MAX_AMPLITUDE);
        }
        if let Some(v) = inputs.filter_cv {
            self.filter_value = clamp_or_low(rescale(v, 0.0, 10.0, -1.0, 1.0), -1.0, 1.0);
        }
    }

    /// Effective values for this sample.
    pub fn resolve(&self) -> ResolvedControls {
        let c = self.clamped();
        ResolvedControls {
            steps: c.steps,
            base_position: c.base_position,
            variance: 2.0_f32.powf(c.variance),
            drift: c.drift,
            drift_divisor: c.drift_type.divisor(c.steps),
            drift_speed: c.drift_speed,
            filter_type: c.filter_type,
            filter_value: apply_deadzone(c.filter_value),
            filter_offset: c.filter_offset,
            amplitude: c.amplitude,
            voltage_scale: c.voltage_scale,
        }
    }
}

/// Per-sample inputs supplied by the host.
///
/// `None` on a CV means the jack is not patched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInputs {
    pub trigger: f32,
    pub reset: f32,
    /// 1..10 V, clamped
    pub position_cv: Option<f32>,
    /// 1..10 V, clamped
    pub variance_cv: Option<f32>,
    /// 0..10 V mapped to -1..1
    pub drift_cv: Option<f32>,
    /// 0..10 V mapped to 0..5
    pub amplitude_cv: Option<f32>,
    /// 0..10 V mapped to -1..1
    pub filter_cv: Option<f32>,
}

impl ControlInputs {
    /// Inputs with only the trigger and reset voltages set.
    pub fn gates(trigger: f32, reset: f32) -> Self {
        Self {
            trigger,
            reset,
            ..Self::default()
        }
    }
}

/// Effective control values after CV override, clamping and mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedControls {
    pub steps: usize,
    pub base_position: f32,
    /// Already exponentiated (2^knob)
    pub variance: f32,
    pub drift: f32,
    pub drift_divisor: f32,
    pub drift_speed: f32,
    pub filter_type: FilterType,
    /// Deadzone applied
    pub filter_value: f32,
    pub filter_offset: usize,
    pub amplitude: f32,
    pub voltage_scale: VoltageScale,
}

impl Default for ResolvedControls {
    fn default() -> Self {
        SequencerConfig::default().resolve()
    }
}

/// Clamp, mapping NaN to the low bound.
#[inline]
fn clamp_or_low(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}
