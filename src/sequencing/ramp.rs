//! Ramp: the per-step values read off the noise field.

/*
Building a Ramp
===============

A ramp is `steps` values taken at equal angles around a small circle in the
noise field:

    angle(r) = r * 2π / steps
    x(r)     = base + sin(angle) * variance / 50
    y(r)     = base + cos(angle) * variance / 50
    z        = seed * 10

Each sample is clamped to [-1, 1] and negated when the voice is inverted.

  base        Where the circle sits. Sliding it morphs the whole sequence.
  variance    The circle's radius (already exponentiated: 2^knob). Small
              radius → steps close together → a gentle melodic contour.
              Large radius → steps far apart → jumpy, unrelated values.


Memoization
-----------

A ramp costs `steps` noise evaluations. The inputs are control values that
rarely change between samples, so `RampCache` keeps the last key and only
recomputes when the key differs (plain float inequality, no tolerance).
Every recompute bumps `generation`, which the mask cache folds into its own
key: a new ramp always forces a new mask.
*/

use std::f32::consts::TAU;

use crate::{dsp::NoiseField, MAX_STEPS, MIN_STEPS};

/// Multiplier for the fixed z coordinate (z = RAMP_SEED * 10).
pub const RAMP_SEED: f64 = 1.0;
/// Divides the variance to get the sampling radius.
const RADIUS_DIVISOR: f32 = 50.0;

/// Fixed-capacity list of step values. Only `len` entries are live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    values: [f32; MAX_STEPS],
    len: usize,
}

impl Ramp {
    pub fn empty() -> Self {
        Self {
            values: [0.0; MAX_STEPS],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value for `step`; 0.0 outside the live range.
    #[inline]
    pub fn get(&self, step: usize) -> f32 {
        if step < self.len {
            self.values[step]
        } else {
            0.0
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.len]
    }

    /// Full backing array, including stale entries past `len`.
    pub fn raw(&self) -> &[f32; MAX_STEPS] {
        &self.values
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::empty()
    }
}

/// Inputs that fully determine a ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampKey {
    pub steps: usize,
    pub base_position: f32,
    pub variance: f32,
    pub invert: bool,
}

/// Sample the noise field around the circle described by `key`.
pub fn compute_ramp(noise: &NoiseField, key: &RampKey) -> Ramp {
    let steps = key.steps.clamp(MIN_STEPS, MAX_STEPS);
    let step_angle = TAU / steps as f32;
    let radius = key.variance / RADIUS_DIVISOR;
    let z = RAMP_SEED * 10.0;

    let mut ramp = Ramp::empty();
    for (r, slot) in ramp.values.iter_mut().take(steps).enumerate() {
        let angle = r as f32 * step_angle;
        let x = key.base_position + angle.sin() * radius;
        let y = key.base_position + angle.cos() * radius;

        let mut value = (noise.evaluate(x as f64, y as f64, z) as f32).clamp(-1.0, 1.0);
        if key.invert {
            value = -value;
        }
        *slot = value;
    }
    ramp.len = steps;
    ramp
}

/// Last computed ramp plus the key it was computed from.
#[derive(Debug, Clone, Default)]
pub struct RampCache {
    key: Option<RampKey>,
    ramp: Ramp,
    generation: u64,
}

impl RampCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute if `key` differs from the cached key. Returns true on recompute.
    pub fn refresh(&mut self, noise: &NoiseField, key: RampKey) -> bool {
        if self.key == Some(key) {
            return false;
        }
        self.ramp = compute_ramp(noise, &key);
        self.key = Some(key);
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Force the next `refresh` to recompute.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn ramp(&self) -> &Ramp {
        &self.ramp
    }

    /// Bumped on every recompute.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(steps: usize) -> RampKey {
        RampKey {
            steps,
            base_position: 5.0,
            variance: 2.0,
            invert: false,
        }
    }

    #[test]
    fn ramp_has_one_value_per_step_in_range() {
        let noise = NoiseField::default();
        for steps in MIN_STEPS..=MAX_STEPS {
            for &variance in &[2.0, 32.0, 1024.0] {
                let ramp = compute_ramp(
                    &noise,
                    &RampKey {
                        variance,
                        ..key(steps)
                    },
                );
                assert_eq!(ramp.len(), steps);
                for &v in ramp.as_slice() {
                    assert!((-1.0..=1.0).contains(&v), "step value {} out of range", v);
                }
            }
        }
    }

    #[test]
    fn invert_negates_every_step() {
        let noise = NoiseField::default();
        let plain = compute_ramp(&noise, &key(8));
        let inverted = compute_ramp(
            &noise,
            &RampKey {
                invert: true,
                ..key(8)
            },
        );
        for (a, b) in plain.as_slice().iter().zip(inverted.as_slice()) {
            assert_eq!(*a, -*b);
        }
    }

    #[test]
    fn cache_skips_unchanged_key() {
        let noise = NoiseField::default();
        let mut cache = RampCache::new();
        assert!(cache.refresh(&noise, key(8)));
        let generation = cache.generation();
        for _ in 0..100 {
            assert!(!cache.refresh(&noise, key(8)));
        }
        assert_eq!(cache.generation(), generation);
    }

    #[test]
    fn cache_recomputes_on_any_key_change() {
        let noise = NoiseField::default();
        let mut cache = RampCache::new();
        cache.refresh(&noise, key(8));

        assert!(cache.refresh(&noise, key(9)));
        assert_eq!(cache.ramp().len(), 9);
        assert!(cache.refresh(
            &noise,
            RampKey {
                base_position: 5.001,
                ..key(9)
            }
        ));
        assert!(cache.refresh(
            &noise,
            RampKey {
                base_position: 5.001,
                invert: true,
                ..key(9)
            }
        ));
    }

    #[test]
    fn invalidate_forces_recompute() {
        let noise = NoiseField::default();
        let mut cache = RampCache::new();
        cache.refresh(&noise, key(4));
        cache.invalidate();
        assert!(cache.refresh(&noise, key(4)));
    }

    #[test]
    fn out_of_range_steps_are_clamped() {
        let noise = NoiseField::default();
        assert_eq!(compute_ramp(&noise, &key(0)).len(), MIN_STEPS);
        assert_eq!(compute_ramp(&noise, &key(99)).len(), MAX_STEPS);
        assert_eq!(compute_ramp(&noise, &key(4)).get(7), 0.0);
    }
}
