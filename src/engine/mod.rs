//! The sequencer voice.

/*
Step Sequencer Voice
====================

One `StepSequencer` is one voice. The host calls `process` once per audio
frame with the current input voltages and gets six output voltages back.

Vocabulary
----------

  step          One slot of the sequence (0..steps). Its raw value comes
                from the ramp, its active/filtered flag from the mask.

  lane          One output pair: a CV that holds the last value written to
                it, and a trigger that pulses 10 V for 1 ms. There are three:
                ACTIVE (steps the filter lets through), FILTERED (steps it
                holds back) and DRONE (step 0 of every cycle).

  latch         A rising trigger edge sets a flag; the step happens when the
                flag is consumed later in the same frame.


The State Machine
-----------------

    ┌──────┐   trigger edge    ┌──────────┐
    │ Idle │ ────────────────→ │ Stepping │ ──┐ trigger edge:
    └──────┘                   └──────────┘ ←─┘ step = (step + 1) % steps
        ↑      reset edge           │
        └───────────────────────────┘

  Idle        current step is None. Lanes hold whatever they last had.
  Stepping    current step is Some(0..steps).

A reset edge and a trigger edge in the same frame resolve as reset first,
so the voice lands on step 0.


One Frame, In Order
-------------------

  1. Drift phase advances (speed-scaled, sample-rate independent).
  2. Patched CVs override their parameters; everything is clamped.
  3. Ramp cache refreshes if (steps, base, variance, invert) changed.
  4. Mask cache refreshes if (type, value, offset, ramp generation) changed.
  5. Reset edge → Idle (and zero drift if the preference says so).
  6. Trigger edge → latch.
  7. Latched → advance and write lanes:

         value = ramp[step]            drone = value
         d     = sin(phase + step * divisor) * drift
         value += d   if the step's lane allows drift
         drone += d   if the drone allows drift
         both  *= amplitude, fold into ±5 V, remap to the output range

     Active steps write the ACTIVE lane, others the FILTERED lane. Step 0
     additionally writes the DRONE lane.

  8. Pulses count down; trigger lanes read 10 V while high.

Nothing here allocates. The caches bound the heavy work to at most one
16-step noise pass and one 16-step mask pass in any frame where inputs moved.
*/

pub mod config;
pub mod display;
pub mod prefs;

use tracing::debug;

pub use config::{ControlInputs, ResolvedControls, SequencerConfig, VoltageScale};
pub use display::DisplaySnapshot;
#[cfg(feature = "serde")]
pub use prefs::PreferencesError;
pub use prefs::{Preference, Preferences};

use crate::{
    dsp::{
        distortion::foldback, noise::DEFAULT_SEED, trigger::PULSE_WIDTH, DriftOscillator,
        NoiseField, PulseGenerator, SchmittTrigger,
    },
    sequencing::{MaskCache, MaskKey, Ramp, RampCache, RampKey, StepMask},
    FOLD_LIMIT, REFERENCE_SAMPLE_RATE, TRIGGER_VOLTAGE,
};

/// The three output lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Active = 0,
    Filtered = 1,
    Drone = 2,
}

/// Voltages produced for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineOutputs {
    pub active_cv: f32,
    pub active_trigger: f32,
    pub filtered_cv: f32,
    pub filtered_trigger: f32,
    pub drone_cv: f32,
    pub drone_trigger: f32,
}

impl EngineOutputs {
    pub fn cv(&self, lane: Lane) -> f32 {
        match lane {
            Lane::Active => self.active_cv,
            Lane::Filtered => self.filtered_cv,
            Lane::Drone => self.drone_cv,
        }
    }

    pub fn trigger(&self, lane: Lane) -> f32 {
        match lane {
            Lane::Active => self.active_trigger,
            Lane::Filtered => self.filtered_trigger,
            Lane::Drone => self.drone_trigger,
        }
    }
}

pub struct StepSequencer {
    config: SequencerConfig,
    prefs: Preferences,
    controls: ResolvedControls,

    noise: NoiseField,
    ramp: RampCache,
    mask: MaskCache,
    drift: DriftOscillator,

    current_step: Option<usize>,
    trigger_pending: bool,
    trigger_in: SchmittTrigger,
    reset_in: SchmittTrigger,

    pulses: [PulseGenerator; 3],
    gates: [bool; 3],
    cv: [f32; 3],

    sample_rate: f32,
    sample_time: f32,
}

impl StepSequencer {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_preferences(sample_rate, Preferences::default())
    }

    pub fn with_preferences(sample_rate: f32, prefs: Preferences) -> Self {
        let sample_rate = sanitize_rate(sample_rate);
        debug!(sample_rate, ?prefs, "creating step sequencer");

        let mut engine = Self {
            config: SequencerConfig::default(),
            prefs,
            controls: ResolvedControls::default(),
            noise: NoiseField::new(DEFAULT_SEED),
            ramp: RampCache::new(),
            mask: MaskCache::new(),
            drift: DriftOscillator::new(sample_rate),
            current_step: None,
            trigger_pending: false,
            trigger_in: SchmittTrigger::for_inputs(),
            reset_in: SchmittTrigger::for_inputs(),
            pulses: [PulseGenerator::new(); 3],
            gates: [false; 3],
            cv: [0.0; 3],
            sample_rate,
            sample_time: 1.0 / sample_rate,
        };
        engine.refresh_caches();
        engine
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let sample_rate = sanitize_rate(sample_rate);
        self.sample_rate = sample_rate;
        self.sample_time = 1.0 / sample_rate;
        self.drift.set_sample_rate(sample_rate);
        debug!(
            sample_rate,
            drift_increment = self.drift.base_increment(),
            "sequencer sample rate changed"
        );
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Return to power-on state: default parameters and preferences, Idle,
    /// zero drift, no pending trigger, silent lanes.
    pub fn reset(&mut self) {
        debug!("resetting step sequencer");
        self.config = SequencerConfig::default();
        self.prefs = Preferences::default();
        self.current_step = None;
        self.trigger_pending = false;
        self.drift.reset();
        self.trigger_in.reset();
        self.reset_in.reset();
        for pulse in &mut self.pulses {
            pulse.reset();
        }
        self.gates = [false; 3];
        self.cv = [0.0; 3];
        self.ramp.invalidate();
        self.mask.invalidate();
        self.refresh_caches();
    }

    /// Run one frame.
    pub fn process(&mut self, inputs: &ControlInputs) -> EngineOutputs {
        self.drift.tick(self.config.drift_speed);

        self.config.apply_cv(inputs);
        self.refresh_caches();

        if self.reset_in.process(inputs.reset) {
            self.current_step = None;
            if self.prefs.reset_also_clears_drift {
                self.drift.reset();
            }
        }

        if self.trigger_in.process(inputs.trigger) {
            self.trigger_pending = true;
        }

        if self.trigger_pending {
            self.trigger_pending = false;
            self.advance();
        }

        for (gate, pulse) in self.gates.iter_mut().zip(self.pulses.iter_mut()) {
            *gate = pulse.process(self.sample_time);
        }

        self.outputs()
    }

    /// Run `process` for each frame of `inputs`, writing into `outputs`.
    ///
    /// Processes `min(inputs.len(), outputs.len())` frames.
    pub fn process_block(&mut self, inputs: &[ControlInputs], outputs: &mut [EngineOutputs]) {
        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            *output = self.process(input);
        }
    }

    fn refresh_caches(&mut self) {
        self.controls = self.config.resolve();
        let c = &self.controls;

        self.ramp.refresh(
            &self.noise,
            RampKey {
                steps: c.steps,
                base_position: c.base_position,
                variance: c.variance,
                invert: self.prefs.invert_voltage,
            },
        );
        self.mask.refresh(
            self.ramp.ramp(),
            MaskKey {
                filter_type: c.filter_type,
                filter_value: c.filter_value,
                filter_offset: c.filter_offset,
                ramp_generation: self.ramp.generation(),
            },
        );
    }

    fn advance(&mut self) {
        let c = self.controls;
        let step = match self.current_step {
            None => 0,
            Some(prev) => (prev + 1) % c.steps,
        };
        self.current_step = Some(step);

        let raw = self.ramp.ramp().get(step);
        let active = self.mask.mask().is_active(step);
        let drift = self.drift.offset(step, c.drift_divisor, c.drift);

        let lane_drifts = if active {
            self.prefs.drift_applies_to_active_steps
        } else {
            self.prefs.drift_applies_to_filtered_steps
        };

        let mut value = raw;
        let mut drone = raw;
        if lane_drifts {
            value += drift;
        }
        if self.prefs.drift_applies_to_drone {
            drone += drift;
        }

        let value = shape(value, &c);
        let drone = shape(drone, &c);

        let lane = if active { Lane::Active } else { Lane::Filtered };
        self.write_lane(lane, value);
        if step == 0 {
            self.write_lane(Lane::Drone, drone);
        }
    }

    #[inline]
    fn write_lane(&mut self, lane: Lane, volts: f32) {
        let idx = lane as usize;
        self.pulses[idx].trigger(PULSE_WIDTH);
        self.cv[idx] = volts;
    }

    fn outputs(&self) -> EngineOutputs {
        let gate = |lane: Lane| {
            if self.gates[lane as usize] {
                TRIGGER_VOLTAGE
            } else {
                0.0
            }
        };
        EngineOutputs {
            active_cv: self.cv[Lane::Active as usize],
            active_trigger: gate(Lane::Active),
            filtered_cv: self.cv[Lane::Filtered as usize],
            filtered_trigger: gate(Lane::Filtered),
            drone_cv: self.cv[Lane::Drone as usize],
            drone_trigger: gate(Lane::Drone),
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Manual parameters. Changes are picked up (and clamped) on the next frame.
    pub fn config_mut(&mut self) -> &mut SequencerConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: SequencerConfig) {
        self.config = config.clamped();
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn set_preferences(&mut self, prefs: Preferences) {
        self.prefs = prefs;
    }

    pub fn toggle_preference(&mut self, pref: Preference) {
        self.prefs.toggle(pref);
    }

    /// Flip voltage inversion; the ramp recomputes on the next frame.
    pub fn toggle_invert(&mut self) {
        self.toggle_preference(Preference::InvertVoltage);
    }

    /// None while Idle.
    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn controls(&self) -> &ResolvedControls {
        &self.controls
    }

    pub fn ramp(&self) -> &Ramp {
        self.ramp.ramp()
    }

    pub fn mask(&self) -> &StepMask {
        self.mask.mask()
    }

    /// Euclidean density behind the current mask; None in threshold mode.
    pub fn euclidean_pulses(&self) -> Option<i32> {
        self.mask.density()
    }

    pub fn drift_phase(&self) -> f32 {
        self.drift.phase()
    }

    /// Bumped every time the ramp is recomputed.
    pub fn ramp_generation(&self) -> u64 {
        self.ramp.generation()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        let c = &self.controls;
        DisplaySnapshot {
            steps: c.steps,
            values: *self.ramp().raw(),
            active: *self.mask().raw(),
            current_step: self.current_step,
            euclidean_pulses: self.mask.density(),
            drift_phase: self.drift.phase(),
            drift_divisor: c.drift_divisor,
            drift_amount: c.drift,
            drift_speed: c.drift_speed,
            drift_type: self.config.drift_type,
            amplitude: c.amplitude,
            base_position: c.base_position,
            variance: self.config.clamped().variance,
            filter_type: c.filter_type,
            filter_value: c.filter_value,
            filter_offset: c.filter_offset,
            voltage_scale: c.voltage_scale,
            preferences: self.prefs,
            gates: self.gates,
        }
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(REFERENCE_SAMPLE_RATE)
    }
}

/// Amplitude, fold into ±5 V, then remap to the output range.
#[inline]
fn shape(volts: f32, controls: &ResolvedControls) -> f32 {
    let folded = foldback(volts * controls.amplitude, FOLD_LIMIT);
    controls.voltage_scale.apply(folded)
}

fn sanitize_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate >= 1.0 {
        sample_rate
    } else {
        1.0
    }
}
