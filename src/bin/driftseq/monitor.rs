//! Monitor - makes the active lane audible
//!
//! A sine voice tracking the active CV at 1 V/octave around A3, struck by
//! the active trigger and decaying exponentially.

use std::f32::consts::TAU;

use drift_seq::EngineOutputs;

const BASE_FREQ: f32 = 220.0;
const DECAY_SECONDS: f32 = 0.15;
const GAIN: f32 = 0.25;

pub struct Monitor {
    phase: f32,
    level: f32,
    decay: f32,
    sample_time: f32,
    was_high: bool,
}

impl Monitor {
    pub fn new(sample_rate: f32) -> Self {
        let sample_time = 1.0 / sample_rate.max(1.0);
        Self {
            phase: 0.0,
            level: 0.0,
            decay: (-sample_time / DECAY_SECONDS).exp(),
            sample_time,
            was_high: false,
        }
    }

    /// Render one sample from the lane outputs of the same frame
    pub fn process(&mut self, out: &EngineOutputs) -> f32 {
        let high = out.active_trigger > 0.0;
        if high && !self.was_high {
            self.level = 1.0;
        }
        self.was_high = high;

        let freq = BASE_FREQ * out.active_cv.clamp(-2.0, 3.0).exp2();
        self.phase += TAU * freq * self.sample_time;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        let sample = self.phase.sin() * self.level * GAIN;
        self.level *= self.decay;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_struck() {
        let mut monitor = Monitor::new(48_000.0);
        let quiet = EngineOutputs::default();
        assert!((0..100).all(|_| monitor.process(&quiet) == 0.0));

        let struck = EngineOutputs {
            active_trigger: 10.0,
            ..EngineOutputs::default()
        };
        let peak = (0..200)
            .map(|_| monitor.process(&struck).abs())
            .fold(0.0f32, f32::max);
        assert!(peak > 0.1, "peak {}", peak);
    }
}
