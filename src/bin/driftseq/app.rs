//! App - audio stream and terminal UI wiring
//!
//! The audio thread owns the sequencer, the host clock and the monitor
//! voice. The UI thread talks to it only through lock-free ring buffers.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info};

use drift_seq::{
    engine::Preference, ControlInputs, EngineOutputs, Preferences, SequencerConfig,
    StepSequencer, MAX_STEPS, MIN_STEPS,
};

use super::clock::Clock;
use super::monitor::Monitor;
use super::ui::{ControlMessage, Param, UiApp, UiStateInit, UiStateUpdate};

/// Frames between UI state updates
const UPDATE_INTERVAL: u32 = 512;
/// Only every Nth monitor sample goes to the scope
const SCOPE_DECIMATION: u32 = 8;

/// Main application builder
pub struct App {
    config: SequencerConfig,
    prefs: Preferences,
    clock_hz: f64,
}

impl App {
    pub fn new(config: SequencerConfig, prefs: Preferences, clock_hz: f64) -> Self {
        Self {
            config,
            prefs,
            clock_hz,
        }
    }

    /// Run until the user quits. Returns the preferences in effect at exit.
    pub fn run(self) -> EyreResult<Preferences> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, clock_hz = self.clock_hz, "starting audio");

        let mut engine = StepSequencer::with_preferences(sample_rate, self.prefs);
        engine.set_config(self.config);

        let initial = UiStateUpdate {
            snapshot: engine.snapshot(),
            clock_running: true,
            clock_hz: self.clock_hz,
            ..UiStateUpdate::default()
        };

        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(64);
        let (state_tx, state_rx) = RingBuffer::<UiStateUpdate>::new(16);
        let (audio_tx, audio_rx) = RingBuffer::<f32>::new(8192);

        let mut state = AudioState {
            engine,
            clock: Clock::new(self.clock_hz, sample_rate as f64),
            monitor: Monitor::new(sample_rate),
            control_rx,
            state_tx,
            audio_tx,
            frame_counter: 0,
        };

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| state.render(data, channels),
            |err| error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        let init = UiStateInit {
            sample_rate,
            channels,
        };
        let mut terminal = ratatui::init();
        let result = UiApp::new(audio_rx, state_rx, control_tx, init, initial).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        let last = result?;
        info!("audio stopped");
        Ok(last.snapshot.preferences)
    }
}

/// State owned by the audio callback
struct AudioState {
    engine: StepSequencer,
    clock: Clock,
    monitor: Monitor,
    control_rx: Consumer<ControlMessage>,
    state_tx: Producer<UiStateUpdate>,
    audio_tx: Producer<f32>,
    frame_counter: u32,
}

impl AudioState {
    fn render(&mut self, data: &mut [f32], channels: usize) {
        while let Ok(msg) = self.control_rx.pop() {
            apply_control(&mut self.engine, &mut self.clock, msg);
        }

        for frame in data.chunks_mut(channels.max(1)) {
            let (trigger, reset) = self.clock.tick();
            let outputs = self.engine.process(&ControlInputs::gates(trigger, reset));
            let sample = self.monitor.process(&outputs);
            frame.fill(sample);

            self.frame_counter = self.frame_counter.wrapping_add(1);
            if self.frame_counter % SCOPE_DECIMATION == 0 {
                let _ = self.audio_tx.push(sample);
            }
            if self.frame_counter % UPDATE_INTERVAL == 0 {
                let _ = self.state_tx.push(self.update(outputs));
            }
        }
    }

    fn update(&self, outputs: EngineOutputs) -> UiStateUpdate {
        UiStateUpdate {
            snapshot: self.engine.snapshot(),
            outputs,
            clock_running: self.clock.is_running(),
            clock_hz: self.clock.rate(),
        }
    }
}

/// Apply a UI command to the audio-side state
fn apply_control(engine: &mut StepSequencer, clock: &mut Clock, msg: ControlMessage) {
    match msg {
        ControlMessage::ToggleClock => clock.toggle(),
        ControlMessage::ScaleClock(factor) => clock.set_rate(clock.rate() * factor),
        ControlMessage::Reset => clock.send_reset(),
        ControlMessage::ModuleReset => engine.reset(),
        ControlMessage::Steps(delta) => {
            let config = engine.config_mut();
            config.steps = (config.steps as i32 + delta).clamp(MIN_STEPS as i32, MAX_STEPS as i32)
                as usize;
        }
        ControlMessage::Offset(delta) => {
            let config = engine.config_mut();
            let steps = config.steps.clamp(MIN_STEPS, MAX_STEPS) as i32;
            config.filter_offset = (config.filter_offset as i32 + delta).rem_euclid(steps) as usize;
        }
        ControlMessage::Nudge(param, delta) => {
            let mut config = *engine.config();
            let slot = match param {
                Param::BasePosition => &mut config.base_position,
                Param::Variance => &mut config.variance,
                Param::Drift => &mut config.drift,
                Param::DriftSpeed => &mut config.drift_speed,
                Param::Filter => &mut config.filter_value,
                Param::Amplitude => &mut config.amplitude,
            };
            *slot += delta;
            engine.set_config(config);
        }
        ControlMessage::CycleDriftType => {
            let config = engine.config_mut();
            config.drift_type = config.drift_type.next();
        }
        ControlMessage::ToggleFilterType => {
            let config = engine.config_mut();
            config.filter_type = config.filter_type.toggled();
        }
        ControlMessage::CycleVoltageScale => {
            let config = engine.config_mut();
            config.voltage_scale = config.voltage_scale.next();
        }
        ControlMessage::TogglePreference(Preference::InvertVoltage) => engine.toggle_invert(),
        ControlMessage::TogglePreference(pref) => engine.toggle_preference(pref),
    }
}
