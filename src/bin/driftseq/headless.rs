//! Headless - offline render that prints every lane event
//!
//! Runs the same clock and sequencer as the live app without an audio
//! device, which makes patterns easy to inspect and diff.

use tracing::info;

use drift_seq::{
    engine::Lane, ControlInputs, EngineOutputs, Preferences, SequencerConfig, StepSequencer,
};

use super::clock::Clock;

/// A trigger lane going high
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneEvent {
    pub frame: u64,
    pub step: usize,
    pub lane: Lane,
    pub volts: f32,
}

/// Render `seconds` of audio-rate frames, calling `on_event` for each lane event
pub fn render(
    config: SequencerConfig,
    prefs: Preferences,
    clock_hz: f64,
    sample_rate: u32,
    seconds: f32,
    mut on_event: impl FnMut(LaneEvent),
) -> usize {
    let mut engine = StepSequencer::with_preferences(sample_rate as f32, prefs);
    engine.set_config(config);
    let mut clock = Clock::new(clock_hz, sample_rate as f64);

    let frames = (seconds.max(0.0) as f64 * sample_rate as f64) as u64;
    let mut previous = EngineOutputs::default();
    let mut count = 0;

    for frame in 0..frames {
        let (trigger, reset) = clock.tick();
        let out = engine.process(&ControlInputs::gates(trigger, reset));

        for lane in [Lane::Active, Lane::Filtered, Lane::Drone] {
            if out.trigger(lane) > 0.0 && previous.trigger(lane) <= 0.0 {
                count += 1;
                on_event(LaneEvent {
                    frame,
                    step: engine.current_step().unwrap_or(0),
                    lane,
                    volts: out.cv(lane),
                });
            }
        }
        previous = out;
    }

    info!(frames, events = count, "headless render finished");
    count
}

/// Print one event as a table row
pub fn print_event(event: LaneEvent, sample_rate: u32) {
    let lane = match event.lane {
        Lane::Active => "active",
        Lane::Filtered => "filtered",
        Lane::Drone => "drone",
    };
    println!(
        "{:>10.4}s  step {:>2}  {:<8}  {:+.3} V",
        event.frame as f64 / sample_rate as f64,
        event.step,
        lane,
        event.volts
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_at_four_hz_steps_four_times() {
        let config = SequencerConfig {
            steps: 4,
            amplitude: 1.0,
            filter_value: 1.0,
            ..SequencerConfig::default()
        };
        let mut events = Vec::new();
        render(config, Preferences::default(), 4.0, 48_000, 1.0, |e| events.push(e));

        let steps: Vec<usize> = events
            .iter()
            .filter(|e| e.lane != Lane::Drone)
            .map(|e| e.step)
            .collect();
        assert_eq!(steps, vec![0, 1, 2, 3]);
        assert_eq!(events.iter().filter(|e| e.lane == Lane::Drone).count(), 1);
    }
}
