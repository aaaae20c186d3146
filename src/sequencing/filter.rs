//! Step filtering: which steps are active and which are filtered out.

/*
Two Ways to Thin a Sequence
===========================

Every step of the ramp is either ACTIVE (routed to the main lane) or
FILTERED (routed to the filtered lane). The filter control, a value in
[-1, 1], drives one of two algorithms.


Euclidean
---------

The filter value is mapped to an integer density:

    density = floor(clamp(rescale(value, -1, 1, -steps-1, steps+1), -steps, steps))

    density == 0        all steps filtered
    density == steps    all steps active
    density == -steps   all steps filtered
    otherwise           pulses = steps - |density|

Each index i in 0..steps is tested with one modular expression and the
result lands on step (i + shift) mod steps:

    hit(i) = (pulses * i) mod steps + pulses

    density > 0   active iff hit(i) <  steps
    density < 0   active iff hit(i) >= steps

Example, steps = 8, density = 3 (pulses = 5):

    i        0  1  2  3  4  5  6  7
    hit      5 10  7 12  9  6 11  8
    active   x  .  x  .  .  x  .  .

Positive density puts exactly `density` active steps on the grid; negative
density produces the complement of the pattern for |density|, so it keeps
`steps - |density|` active. The two signs are deliberately not mirror
images of each other.


Noise Threshold
---------------

A step's own ramp value decides. With t = |value|:

    in_band(v) = v <= t  &&  v >= -t + 0.15

    value > 0   active iff  in_band
    value < 0   active iff !in_band
    value == 0  all filtered

Values within ±0.02 of zero are snapped to exactly 0 before they get here
(see `apply_deadzone`), so a centred knob reliably filters everything.


Memoization
-----------

`MaskCache` keys on (type, value, shift, ramp generation). The ramp
generation means a recomputed ramp always invalidates the mask, even when
the filter controls themselves did not move.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ramp::Ramp;
use crate::{dsp::distortion::rescale, MAX_STEPS};

/// Filter values strictly inside (-DEADZONE, DEADZONE) snap to 0.
pub const FILTER_DEADZONE: f32 = 0.02;
/// Lower edge offset of the threshold band.
const BAND_FLOOR_OFFSET: f32 = 0.15;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Euclidean,
    NoiseThreshold,
}

impl FilterType {
    pub fn label(self) -> &'static str {
        match self {
            FilterType::Euclidean => "Euclidean",
            FilterType::NoiseThreshold => "Noise",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FilterType::Euclidean => FilterType::NoiseThreshold,
            FilterType::NoiseThreshold => FilterType::Euclidean,
        }
    }
}

/// Fixed-capacity active/filtered flags. Only `len` entries are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMask {
    active: [bool; MAX_STEPS],
    len: usize,
}

impl StepMask {
    pub fn all(len: usize, active: bool) -> Self {
        let len = len.min(MAX_STEPS);
        let mut mask = Self {
            active: [false; MAX_STEPS],
            len,
        };
        mask.active[..len].fill(active);
        mask
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `step` is active; false outside the live range.
    #[inline]
    pub fn is_active(&self, step: usize) -> bool {
        step < self.len && self.active[step]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.active[..self.len]
    }

    pub fn active_count(&self) -> usize {
        self.as_slice().iter().filter(|&&a| a).count()
    }

    /// Full backing array, including stale entries past `len`.
    pub fn raw(&self) -> &[bool; MAX_STEPS] {
        &self.active
    }
}

impl Default for StepMask {
    fn default() -> Self {
        Self::all(0, false)
    }
}

/// Snap values near zero to exactly zero.
#[inline]
pub fn apply_deadzone(value: f32) -> f32 {
    if value > -FILTER_DEADZONE && value < FILTER_DEADZONE {
        0.0
    } else {
        value
    }
}

/// Map a filter value in [-1, 1] to a signed density in [-steps, steps].
#[inline]
pub fn euclidean_density(filter_value: f32, steps: usize) -> i32 {
    let n = steps as f32;
    let mapped = rescale(filter_value, -1.0, 1.0, -n - 1.0, n + 1.0);
    mapped.clamp(-n, n).floor() as i32
}

/// Distribute active steps with the modular hit formula (see module docs).
pub fn euclidean_mask(steps: usize, density: i32, shift: usize) -> StepMask {
    let steps = steps.min(MAX_STEPS);
    if steps == 0 {
        return StepMask::default();
    }
    let n = steps as i32;

    if density == 0 || density <= -n {
        return StepMask::all(steps, false);
    }
    if density >= n {
        return StepMask::all(steps, true);
    }

    let pulses = (n - density.abs()) as usize;
    let mut mask = StepMask::all(steps, false);
    for i in 0..steps {
        let hit = (pulses * i) % steps + pulses;
        let active = if density > 0 { hit < steps } else { hit >= steps };
        mask.active[(i + shift) % steps] = active;
    }
    mask
}

/// Mark steps by whether their ramp value falls inside the threshold band.
pub fn threshold_mask(ramp: &Ramp, filter_value: f32) -> StepMask {
    let mut mask = StepMask::all(ramp.len(), false);
    if filter_value == 0.0 || filter_value.is_nan() {
        return mask;
    }

    let t = filter_value.abs();
    let invert = filter_value < 0.0;
    for (slot, &v) in mask.active.iter_mut().zip(ramp.as_slice()) {
        let in_band = v <= t && v >= -t + BAND_FLOOR_OFFSET;
        *slot = in_band != invert;
    }
    mask
}

/// Inputs that fully determine a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskKey {
    pub filter_type: FilterType,
    pub filter_value: f32,
    pub filter_offset: usize,
    pub ramp_generation: u64,
}

/// Compute the mask for `ramp` with the filter settings in `key`.
pub fn compute_mask(ramp: &Ramp, key: &MaskKey) -> StepMask {
    match key.filter_type {
        FilterType::Euclidean => {
            let density = euclidean_density(key.filter_value, ramp.len());
            euclidean_mask(ramp.len(), density, key.filter_offset)
        }
        FilterType::NoiseThreshold => threshold_mask(ramp, key.filter_value),
    }
}

/// Last computed mask plus the key it was computed from.
#[derive(Debug, Clone, Default)]
pub struct MaskCache {
    key: Option<MaskKey>,
    mask: StepMask,
    density: Option<i32>,
}

impl MaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute if `key` differs from the cached key. Returns true on recompute.
    pub fn refresh(&mut self, ramp: &Ramp, key: MaskKey) -> bool {
        if self.key == Some(key) {
            return false;
        }
        self.mask = compute_mask(ramp, &key);
        self.density = match key.filter_type {
            FilterType::Euclidean => Some(euclidean_density(key.filter_value, ramp.len())),
            FilterType::NoiseThreshold => None,
        };
        self.key = Some(key);
        true
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn mask(&self) -> &StepMask {
        &self.mask
    }

    /// Euclidean density behind the current mask; None in threshold mode.
    pub fn density(&self) -> Option<i32> {
        self.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::NoiseField,
        sequencing::ramp::{compute_ramp, RampKey},
    };

    fn pattern(mask: &StepMask) -> String {
        mask.as_slice()
            .iter()
            .map(|&a| if a { 'x' } else { '.' })
            .collect()
    }

    fn test_ramp(steps: usize) -> Ramp {
        compute_ramp(
            &NoiseField::default(),
            &RampKey {
                steps,
                base_position: 3.0,
                variance: 512.0,
                invert: false,
            },
        )
    }

    #[test]
    fn density_mapping_hits_both_ends() {
        assert_eq!(euclidean_density(-1.0, 8), -8);
        assert_eq!(euclidean_density(1.0, 8), 8);
        assert_eq!(euclidean_density(0.0, 8), 0);
        // steps = 4: mapped = 5 * value
        assert_eq!(euclidean_density(0.5, 4), 2);
        assert_eq!(euclidean_density(-0.5, 4), -3);
    }

    #[test]
    fn zero_density_filters_everything() {
        for steps in 2..=MAX_STEPS {
            assert_eq!(euclidean_mask(steps, 0, 0).active_count(), 0);
        }
    }

    #[test]
    fn full_density_keeps_everything() {
        for steps in 2..=MAX_STEPS {
            let n = steps as i32;
            assert_eq!(euclidean_mask(steps, n, 0).active_count(), steps);
            assert_eq!(euclidean_mask(steps, -n, 0).active_count(), 0);
        }
    }

    #[test]
    fn positive_density_keeps_pulse_count() {
        for steps in 2..=MAX_STEPS {
            for density in 1..steps as i32 {
                for shift in 0..steps {
                    let mask = euclidean_mask(steps, density, shift);
                    assert_eq!(
                        steps - mask.active_count(),
                        steps - density as usize,
                        "steps={} density={} shift={}",
                        steps,
                        density,
                        shift
                    );
                }
            }
        }
    }

    #[test]
    fn negative_density_is_the_complement() {
        for steps in 2..=MAX_STEPS {
            for density in 1..steps as i32 {
                let pos = euclidean_mask(steps, density, 0);
                let neg = euclidean_mask(steps, -density, 0);
                for i in 0..steps {
                    assert_ne!(pos.is_active(i), neg.is_active(i));
                }
            }
        }
    }

    #[test]
    fn known_patterns() {
        assert_eq!(pattern(&euclidean_mask(4, 2, 0)), "x.x.");
        assert_eq!(pattern(&euclidean_mask(4, 2, 1)), ".x.x");
        assert_eq!(pattern(&euclidean_mask(8, 3, 0)), "x.x..x..");
        assert_eq!(pattern(&euclidean_mask(8, -3, 0)), ".x.xx.xx");
        assert_eq!(pattern(&euclidean_mask(8, 3, 2)), "..x.x..x");
    }

    #[test]
    fn deadzone_snaps_small_values() {
        assert_eq!(apply_deadzone(0.019), 0.0);
        assert_eq!(apply_deadzone(-0.019), 0.0);
        assert_eq!(apply_deadzone(0.02), 0.02);
        assert_eq!(apply_deadzone(-0.5), -0.5);
    }

    #[test]
    fn zero_threshold_filters_everything() {
        for steps in 2..=MAX_STEPS {
            assert_eq!(threshold_mask(&test_ramp(steps), 0.0).active_count(), 0);
        }
    }

    #[test]
    fn threshold_band_matches_formula() {
        let ramp = test_ramp(16);
        for &value in &[0.9, 0.4, -0.4, -0.9] {
            let mask = threshold_mask(&ramp, value);
            let t: f32 = value.abs();
            for (i, &v) in ramp.as_slice().iter().enumerate() {
                let in_band = v <= t && v >= -t + 0.15;
                let expected = if value > 0.0 { in_band } else { !in_band };
                assert_eq!(mask.is_active(i), expected, "value={} step={} v={}", value, i, v);
            }
        }
    }

    #[test]
    fn mask_cache_tracks_ramp_generation() {
        let ramp = test_ramp(8);
        let mut cache = MaskCache::new();
        let key = MaskKey {
            filter_type: FilterType::Euclidean,
            filter_value: 0.5,
            filter_offset: 0,
            ramp_generation: 1,
        };
        assert!(cache.refresh(&ramp, key));
        assert!(!cache.refresh(&ramp, key));
        assert!(cache.refresh(
            &ramp,
            MaskKey {
                ramp_generation: 2,
                ..key
            }
        ));
        assert_eq!(cache.density(), Some(euclidean_density(0.5, 8)));

        cache.refresh(
            &ramp,
            MaskKey {
                filter_type: FilterType::NoiseThreshold,
                ..key
            },
        );
        assert_eq!(cache.density(), None);
    }
}
