//! TUI module for driftseq
//!
//! Shows the step pattern, lane voltages and monitor output, and turns
//! key presses into control messages for the audio thread.

mod scope;
pub mod state;
mod steps;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;
use tracing::warn;

use drift_seq::engine::Preference;

pub use state::{ControlMessage, Param, UiStateInit, UiStateUpdate};

use scope::render_scope;
use steps::{render_params, render_steps};
use transport::{render_transport, AudioStats};

/// Monitor visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// UI application state
pub struct UiApp {
    /// Ring buffer receiver for monitor samples
    audio_rx: Consumer<f32>,
    /// Ring buffer receiver for state updates
    state_rx: Consumer<UiStateUpdate>,
    /// Ring buffer sender for commands
    control_tx: Producer<ControlMessage>,
    /// Static info
    init: UiStateInit,
    /// Current state (latest received)
    current_state: UiStateUpdate,
    /// Monitor sample buffer for visualization
    audio_buffer: Vec<f32>,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    /// Create a new UI application
    pub fn new(
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiStateUpdate>,
        control_tx: Producer<ControlMessage>,
        init: UiStateInit,
        initial_state: UiStateUpdate,
    ) -> Self {
        Self {
            audio_rx,
            state_rx,
            control_tx,
            init,
            current_state: initial_state,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            should_quit: false,
        }
    }

    /// Run the UI event loop, returning the last state seen
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<UiStateUpdate> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        // Pick up the effect of the last commands before returning
        std::thread::sleep(Duration::from_millis(30));
        self.poll_state();
        Ok(self.current_state)
    }

    /// Poll for new monitor samples, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    /// Poll for state updates, keeping only the latest
    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = state;
        }
    }

    fn send(&mut self, msg: ControlMessage) {
        if self.control_tx.push(msg).is_err() {
            warn!(?msg, "control queue full, dropping command");
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        use ControlMessage::*;

        let msg = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(' ') => ToggleClock,
            KeyCode::Char('r') => Reset,
            KeyCode::Char('R') => ModuleReset,
            KeyCode::Char('[') => ScaleClock(0.8),
            KeyCode::Char(']') => ScaleClock(1.25),
            KeyCode::Left => Steps(-1),
            KeyCode::Right => Steps(1),
            KeyCode::Char('p') => Nudge(Param::BasePosition, -0.05),
            KeyCode::Char('P') => Nudge(Param::BasePosition, 0.05),
            KeyCode::Char('v') => Nudge(Param::Variance, -0.1),
            KeyCode::Char('V') => Nudge(Param::Variance, 0.1),
            KeyCode::Char('d') => Nudge(Param::Drift, -0.05),
            KeyCode::Char('D') => Nudge(Param::Drift, 0.05),
            KeyCode::Char('s') => Nudge(Param::DriftSpeed, -0.5),
            KeyCode::Char('S') => Nudge(Param::DriftSpeed, 0.5),
            KeyCode::Down => Nudge(Param::Filter, -0.05),
            KeyCode::Up => Nudge(Param::Filter, 0.05),
            KeyCode::Char('o') => Offset(-1),
            KeyCode::Char('O') => Offset(1),
            KeyCode::Char('a') => Nudge(Param::Amplitude, -0.1),
            KeyCode::Char('A') => Nudge(Param::Amplitude, 0.1),
            KeyCode::Char('t') => CycleDriftType,
            KeyCode::Char('f') => ToggleFilterType,
            KeyCode::Char('g') => CycleVoltageScale,
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                TogglePreference(Preference::ALL[idx])
            }
            _ => return,
        };
        self.send(msg);
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(10),   // Steps + parameters
                Constraint::Length(8), // Monitor
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], &self.init, &self.current_state, &stats);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(36)])
            .split(chunks[1]);
        render_steps(frame, middle[0], &self.current_state);
        render_params(frame, middle[1], &self.current_state);

        render_scope(frame, chunks[2], &self.audio_buffer);

        let help = Paragraph::new(
            " [Q] Quit [Space] Clock [r/R] Reset/Init [←→] Steps [↑↓] Filter [pP vV dD sS aA oO] Params [t f g] Modes [1-5] Prefs",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
