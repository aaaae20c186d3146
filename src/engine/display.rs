//! Read-only view of the voice for displays.
//!
//! A `DisplaySnapshot` is a plain `Copy` value, so the audio thread can hand
//! it to a UI thread through a ring buffer without allocating.

use crate::{
    dsp::{distortion::foldback, DriftType},
    sequencing::FilterType,
    Preferences, FOLD_LIMIT, MAX_STEPS,
};

use super::config::VoltageScale;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySnapshot {
    /// Live step count; entries past it in the arrays are stale
    pub steps: usize,
    /// Raw ramp values (inversion applied, no drift/amplitude)
    pub values: [f32; MAX_STEPS],
    pub active: [bool; MAX_STEPS],
    /// None until the first trigger after construction or reset
    pub current_step: Option<usize>,
    /// Euclidean density behind the mask; None in threshold mode
    pub euclidean_pulses: Option<i32>,
    pub drift_phase: f32,
    pub drift_divisor: f32,
    pub drift_amount: f32,
    pub drift_speed: f32,
    pub drift_type: DriftType,
    pub amplitude: f32,
    pub base_position: f32,
    /// Variance knob value, before exponentiation
    pub variance: f32,
    pub filter_type: FilterType,
    pub filter_value: f32,
    pub filter_offset: usize,
    pub voltage_scale: VoltageScale,
    pub preferences: Preferences,
    /// Trigger lanes high this sample: active, filtered, drone
    pub gates: [bool; 3],
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self {
            steps: 0,
            values: [0.0; MAX_STEPS],
            active: [false; MAX_STEPS],
            current_step: None,
            euclidean_pulses: None,
            drift_phase: 0.0,
            drift_divisor: 0.0,
            drift_amount: 0.0,
            drift_speed: 1.0,
            drift_type: DriftType::default(),
            amplitude: 0.0,
            base_position: 1.0,
            variance: 1.0,
            filter_type: FilterType::default(),
            filter_value: 0.0,
            filter_offset: 0,
            voltage_scale: VoltageScale::default(),
            preferences: Preferences::default(),
            gates: [false; 3],
        }
    }
}

impl DisplaySnapshot {
    /// Preview voltage of every step in the bipolar domain.
    ///
    /// Drift is always shown regardless of the per-lane drift preferences,
    /// so the display reflects where each step is heading.
    pub fn display_voltages(&self) -> [f32; MAX_STEPS] {
        let mut volts = [0.0; MAX_STEPS];
        for (i, slot) in volts.iter_mut().enumerate().take(self.steps) {
            let angle = self.drift_phase + i as f32 * self.drift_divisor;
            let drift = angle.sin() * self.drift_amount;
            *slot = foldback((self.values[i] + drift) * self.amplitude, FOLD_LIMIT);
        }
        volts
    }

    /// Preview of the drone line (step 0).
    pub fn drone_voltage(&self) -> f32 {
        self.display_voltages()[0]
    }

    pub fn live_values(&self) -> &[f32] {
        &self.values[..self.steps.min(MAX_STEPS)]
    }

    pub fn live_active(&self) -> &[bool] {
        &self.active[..self.steps.min(MAX_STEPS)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_applies_amplitude_and_fold() {
        let mut snap = DisplaySnapshot {
            steps: 3,
            amplitude: 5.0,
            ..DisplaySnapshot::default()
        };
        snap.values[0] = 0.5;
        snap.values[1] = -1.0;
        snap.values[2] = 1.0;
        snap.drift_amount = 0.2;
        // Flat drift at a quarter turn adds the full amount to every step
        snap.drift_phase = std::f32::consts::FRAC_PI_2;

        let volts = snap.display_voltages();
        assert!((volts[0] - 3.5).abs() < 1e-5);
        assert!((volts[1] + 4.0).abs() < 1e-5);
        // (1.0 + 0.2) * 5 = 6 folds to 4
        assert!((volts[2] - 4.0).abs() < 1e-5);
        assert_eq!(volts[3], 0.0);
        assert_eq!(snap.drone_voltage(), volts[0]);
    }
}
