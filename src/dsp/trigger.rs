//! Edge detection and one-shot pulses.

/*
Triggers in a Voltage World
===========================

Modular gear talks in voltages, not events. A "trigger" is a short jump
from ~0 V to several volts. To turn that into a discrete event we need to
spot the moment the voltage RISES, once, even if the cable is noisy.

Vocabulary
----------

  edge          The instant a signal crosses from low to high (rising edge)
                or high to low (falling edge). Only rising edges count here.

  hysteresis    Using two thresholds instead of one. The input must climb
                above HIGH to count as high, and fall below LOW to count as
                low again. Noise wobbling around a single threshold would
                otherwise fire many edges.

  pulse         A fixed-width high output (1 ms here) emitted after an event,
                so downstream gear sees a clean trigger.


Schmitt Trigger
---------------

          high ─ ─ ─ ─ ─ ─╱‾‾‾‾‾‾‾‾╲─ ─ ─ ─ ─ ─ ─ ─ ─
    input             ╱            ╲
          low  ─ ─ ─╱─ ─ ─ ─ ─ ─ ─ ─╲─ ─ ─ ─ ─ ─ ─ ─
                    ↑                ↑
              (nothing yet)     state → Low
                          ↑
                  crosses high: state → High, report edge

The detector only reports `true` on the Low → High transition. Staying high
reports nothing; dipping between the thresholds changes nothing.

Before the first sample the state is unknown. The first sample decides the
state without reporting an edge, so a cable that is already high when the
voice starts does not fire a spurious step.


Pulse Generator
---------------

`trigger(width)` arms the pulse for `width` seconds. `process(dt)` counts
down and reports whether the pulse is still high. Re-triggering while high
restarts the window, so back-to-back events stay distinguishable by their
own full width rather than being swallowed.
*/

/// Low threshold used by the sequencer's trigger and reset inputs (volts).
pub const INPUT_LOW_THRESHOLD: f32 = 0.01;
/// High threshold used by the sequencer's trigger and reset inputs (volts).
pub const INPUT_HIGH_THRESHOLD: f32 = 2.0;
/// Width of every output pulse (seconds).
pub const PULSE_WIDTH: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchmittState {
    Low,
    High,
    Uninitialized,
}

/// Two-threshold rising-edge detector.
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    state: SchmittState,
    low_threshold: f32,
    high_threshold: f32,
}

impl SchmittTrigger {
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            state: SchmittState::Uninitialized,
            low_threshold,
            high_threshold,
        }
    }

    /// Detector with the thresholds the sequencer inputs use.
    pub fn for_inputs() -> Self {
        Self::new(INPUT_LOW_THRESHOLD, INPUT_HIGH_THRESHOLD)
    }

    /// Feed one sample. Returns true only on a Low → High transition.
    pub fn process(&mut self, input: f32) -> bool {
        match self.state {
            SchmittState::Uninitialized => {
                self.state = if input >= self.high_threshold {
                    SchmittState::High
                } else {
                    SchmittState::Low
                };
                false
            }
            SchmittState::High => {
                if input <= self.low_threshold {
                    self.state = SchmittState::Low;
                }
                false
            }
            SchmittState::Low => {
                if input >= self.high_threshold {
                    self.state = SchmittState::High;
                    return true;
                }
                false
            }
        }
    }

    pub fn state(&self) -> SchmittState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = SchmittState::Uninitialized;
    }
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::for_inputs()
    }
}

/// Retriggerable one-shot pulse.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseGenerator {
    remaining: f32,
}

impl PulseGenerator {
    pub fn new() -> Self {
        Self { remaining: 0.0 }
    }

    /// Arm (or re-arm) the pulse for `width` seconds.
    pub fn trigger(&mut self, width: f32) {
        self.remaining = width.max(0.0);
    }

    /// Advance by `dt` seconds. Returns whether the pulse is high this sample.
    pub fn process(&mut self, dt: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }
}
