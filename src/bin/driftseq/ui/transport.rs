//! Transport bar widget - shows clock state, step position and lane voltages

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the transport bar
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    dynamic_state: &UiStateUpdate,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" driftseq ").borders(Borders::ALL);

    let snap = &dynamic_state.snapshot;
    let play_symbol = if dynamic_state.clock_running { "▶" } else { "⏸" };
    let step_str = match snap.current_step {
        Some(step) => format!("Step {:>2}/{}  ", step + 1, snap.steps),
        None => format!("Step  -/{}  ", snap.steps),
    };
    let sample_rate_khz = static_state.sample_rate / 1000.0;
    let out = &dynamic_state.outputs;

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {:.2} Hz  ", play_symbol, dynamic_state.clock_hz),
            Style::default().fg(if dynamic_state.clock_running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(step_str, Style::default().fg(Color::White)),
        Span::styled(
            format!("ACT {:+.2}V  ", out.active_cv),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("FLT {:+.2}V  ", out.filtered_cv),
            Style::default().fg(Color::Blue),
        ),
        Span::styled(
            format!("DRN {:+.2}V  ", out.drone_cv),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("{:.1}kHz/{}ch  ", sample_rate_khz, static_state.channels),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
