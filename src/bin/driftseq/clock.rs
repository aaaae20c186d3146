//! Clock - host-side trigger source
//!
//! Stands in for a patched clock module: produces a square gate at a fixed
//! rate that feeds the sequencer's trigger input, plus an optional one-shot
//! gate for the reset input. Each period starts low so the first rising
//! edge lands half a period in.

/// Square-wave gate generator running in the audio thread
pub struct Clock {
    /// Trigger rate in Hz
    rate_hz: f64,
    /// Audio sample rate
    sample_rate: f64,
    /// Position within the current period (0.0..1.0)
    phase: f64,
    /// Phase advance per sample
    increment: f64,
    /// Whether the clock is running
    running: bool,
    /// Samples left on a pending reset gate
    reset_samples: u32,
}

/// Gate voltage while high
const GATE_HIGH: f32 = 10.0;
/// Reset gates last this many samples
const RESET_GATE_SAMPLES: u32 = 64;

impl Clock {
    /// Create a new clock
    pub fn new(rate_hz: f64, sample_rate: f64) -> Self {
        Self {
            rate_hz,
            sample_rate,
            phase: 0.0,
            increment: Self::compute_increment(rate_hz, sample_rate),
            running: true,
            reset_samples: 0,
        }
    }

    fn compute_increment(rate_hz: f64, sample_rate: f64) -> f64 {
        if sample_rate <= 0.0 {
            return 0.0;
        }
        rate_hz.max(0.0) / sample_rate
    }

    /// Set the trigger rate (can be called at any time)
    pub fn set_rate(&mut self, rate_hz: f64) {
        self.rate_hz = rate_hz.clamp(0.1, 100.0);
        self.increment = Self::compute_increment(self.rate_hz, self.sample_rate);
    }

    pub fn rate(&self) -> f64 {
        self.rate_hz
    }

    /// Advance one sample, returning (trigger, reset) voltages
    pub fn tick(&mut self) -> (f32, f32) {
        let trigger = if self.running && self.phase >= 0.5 {
            GATE_HIGH
        } else {
            0.0
        };
        if self.running {
            self.phase += self.increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }

        let reset = if self.reset_samples > 0 {
            self.reset_samples -= 1;
            GATE_HIGH
        } else {
            0.0
        };

        (trigger, reset)
    }

    /// Queue a reset gate and restart the period
    pub fn send_reset(&mut self) {
        self.reset_samples = RESET_GATE_SAMPLES;
        self.phase = 0.0;
    }

    /// Toggle run/stop
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }
}
