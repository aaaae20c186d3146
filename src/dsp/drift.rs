//! Drift: a very slow sine offset shared by all steps.

/*
Drift
=====

Drift is an LFO slowed down until it stops sounding like modulation and
starts sounding like the sequence is wandering. One phase accumulator is
shared by the whole voice; every step reads it with its own angular offset:

    offset(step) = sin(phase + step * divisor) * amount

Vocabulary
----------

  phase         Accumulated angle in radians, kept in [0, 2π).

  increment     Radians added per sample. Calibrated at 44.1 kHz and scaled
                by 44100 / sample_rate, so one drift cycle takes the same
                wall-clock time at any rate.

  divisor       Angle between neighbouring steps. It decides how the drift
                is spread over the sequence:

                    Sphere      2π / steps   steps cover one full sine
                    Hemisphere   π / steps   steps cover half a sine
                    Flat         0           every step moves together

Reference speed: 1.25e-6 rad/sample at 44.1 kHz is ~0.055 rad/s, about
two minutes per cycle at speed 1. The speed knob (1..10) multiplies it.


Wrapping
--------

When the phase reaches 2π it is set back to 0 rather than reduced by 2π.
The increment is tiny, so the discontinuity is far below audibility, and
the phase can never be negative or reach 2π.
*/

use std::f32::consts::{PI, TAU};
use std::f64::consts::TAU as TAU_F64;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::REFERENCE_SAMPLE_RATE;

/// Radians per sample at the reference rate and speed 1.
pub const BASE_DRIFT_INCREMENT: f32 = 0.000_001_25;

pub const MIN_DRIFT_SPEED: f32 = 1.0;
pub const MAX_DRIFT_SPEED: f32 = 10.0;

/// How the drift angle is spread across steps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftType {
    #[default]
    Sphere,
    Hemisphere,
    Flat,
}

impl DriftType {
    /// Angle between neighbouring steps for a sequence of `steps`.
    #[inline]
    pub fn divisor(self, steps: usize) -> f32 {
        let steps = steps.max(1) as f32;
        match self {
            DriftType::Sphere => TAU / steps,
            DriftType::Hemisphere => PI / steps,
            DriftType::Flat => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DriftType::Sphere => "Sphere",
            DriftType::Hemisphere => "Hemisphere",
            DriftType::Flat => "Flat",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DriftType::Sphere => DriftType::Hemisphere,
            DriftType::Hemisphere => DriftType::Flat,
            DriftType::Flat => DriftType::Sphere,
        }
    }
}

/// Free-running phase accumulator.
///
/// The phase is `f64`; near 2π an `f32` ulp is as large as the per-sample increment.
#[derive(Debug, Clone, Copy)]
pub struct DriftOscillator {
    phase: f64,
    base_increment: f64,
}

impl DriftOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            base_increment: Self::increment_for(sample_rate),
        }
    }

    /// Per-sample increment at speed 1 for the given rate.
    pub fn increment_for(sample_rate: f32) -> f64 {
        let sample_rate = if sample_rate.is_finite() {
            sample_rate.max(1.0)
        } else {
            REFERENCE_SAMPLE_RATE
        };
        BASE_DRIFT_INCREMENT as f64 * (REFERENCE_SAMPLE_RATE as f64 / sample_rate as f64)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.base_increment = Self::increment_for(sample_rate);
    }

    /// Advance by one sample at `speed` (clamped to 1..=10).
    #[inline]
    pub fn tick(&mut self, speed: f32) {
        let speed = speed.clamp(MIN_DRIFT_SPEED, MAX_DRIFT_SPEED) as f64;
        self.step(self.base_increment * speed);
    }

    /// Advance by a raw angle. Negative or non-finite angles are ignored.
    #[inline]
    pub fn advance(&mut self, radians: f32) {
        self.step(radians as f64);
    }

    #[inline]
    fn step(&mut self, radians: f64) {
        if radians.is_finite() && radians > 0.0 {
            self.phase += radians;
        }
        if self.phase >= TAU_F64 {
            self.phase = 0.0;
        }
    }

    /// Drift offset for `step` given a divisor and amount.
    #[inline]
    pub fn offset(&self, step: usize, divisor: f32, amount: f32) -> f32 {
        ((self.phase + step as f64 * divisor as f64).sin() * amount as f64) as f32
    }

    /// Current phase in [0, 2π).
    pub fn phase(&self) -> f32 {
        let phase = self.phase as f32;
        // Narrowing can round a phase just below 2π up to it
        if phase >= TAU {
            0.0
        } else {
            phase
        }
    }

    pub fn base_increment(&self) -> f64 {
        self.base_increment
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Default for DriftOscillator {
    fn default() -> Self {
        Self::new(REFERENCE_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_scales_with_sample_rate() {
        let base = BASE_DRIFT_INCREMENT as f64;
        let at_ref = DriftOscillator::increment_for(44_100.0);
        let at_double = DriftOscillator::increment_for(88_200.0);
        assert!((at_ref - base).abs() < 1e-15);
        assert!((at_double - base / 2.0).abs() < 1e-15);
    }

    #[test]
    fn phase_stays_in_range() {
        let mut osc = DriftOscillator::new(48_000.0);
        for _ in 0..1_000 {
            osc.advance(0.37);
            assert!(osc.phase() >= 0.0 && osc.phase() < TAU, "phase {}", osc.phase());
        }
    }

    #[test]
    fn full_turn_wraps_to_zero() {
        let mut osc = DriftOscillator::default();
        osc.advance(PI);
        osc.advance(PI);
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn late_phase_speed_is_rate_independent() {
        // Ten seconds of drift at speed 1, starting past half a turn
        let expected = BASE_DRIFT_INCREMENT as f64 * REFERENCE_SAMPLE_RATE as f64 * 10.0;
        for rate in [44_100u32, 48_000, 96_000, 384_000] {
            let mut osc = DriftOscillator::new(rate as f32);
            osc.advance(4.5);
            let start = osc.phase() as f64;
            for _ in 0..rate * 10 {
                osc.tick(1.0);
            }
            let moved = osc.phase() as f64 - start;
            assert!(
                (moved - expected).abs() < expected * 1e-3,
                "{} Hz moved {} rad, expected {}",
                rate,
                moved,
                expected
            );
        }
    }

    #[test]
    fn tick_clamps_speed() {
        let mut slow = DriftOscillator::default();
        let mut clamped = DriftOscillator::default();
        slow.tick(1.0);
        clamped.tick(-50.0);
        assert_eq!(slow.phase(), clamped.phase());

        let mut fast = DriftOscillator::default();
        let mut over = DriftOscillator::default();
        fast.tick(10.0);
        over.tick(1_000.0);
        assert_eq!(fast.phase(), over.phase());
    }

    #[test]
    fn divisors_per_type() {
        assert!((DriftType::Sphere.divisor(8) - TAU / 8.0).abs() < 1e-6);
        assert!((DriftType::Hemisphere.divisor(8) - PI / 8.0).abs() < 1e-6);
        assert_eq!(DriftType::Flat.divisor(8), 0.0);
    }

    #[test]
    fn offset_follows_step_angle() {
        let osc = DriftOscillator::default();
        let div = DriftType::Sphere.divisor(4);
        // phase 0: step 1 sits a quarter turn in
        assert!((osc.offset(1, div, 0.5) - 0.5).abs() < 1e-6);
        assert!(osc.offset(0, div, 0.5).abs() < 1e-6);
    }
}
