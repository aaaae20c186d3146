//! Step widget - one bar per step with playhead, filter state and drone line

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use drift_seq::{engine::Preference, sequencing::FilterType, FOLD_LIMIT};

use super::UiStateUpdate;

/// Render the step bars
///
/// Each column is one step, drawn from 0 V towards its previewed voltage.
/// Active steps are cyan, filtered steps gray, the current step is bold
/// yellow. The drone voltage is drawn as a horizontal line.
pub fn render_steps(frame: &mut Frame, area: Rect, state: &UiStateUpdate) {
    let snap = &state.snapshot;
    let title = match snap.euclidean_pulses {
        Some(pulses) => format!(" Steps  [{} pulses] ", pulses),
        None => " Steps  [threshold] ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 8 || snap.steps == 0 {
        return;
    }

    let volts = snap.display_voltages();
    let drone = snap.drone_voltage();
    let rows = inner.height.saturating_sub(1) as usize;
    let col_width = ((inner.width as usize) / snap.steps).clamp(1, 6);
    let bar_width = col_width.saturating_sub(1).max(1);

    // Volts at the centre of a row, top row is +FOLD_LIMIT
    let level = |row: usize| FOLD_LIMIT - (row as f32 + 0.5) * (2.0 * FOLD_LIMIT) / rows as f32;
    let row_span = 2.0 * FOLD_LIMIT / rows as f32;
    let drone_row = (0..rows)
        .min_by(|&a, &b| {
            (level(a) - drone)
                .abs()
                .partial_cmp(&(level(b) - drone).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(rows + 1);
    for row in 0..rows {
        let lv = level(row);
        let mut spans = Vec::with_capacity(snap.steps);
        for (step, &v) in volts.iter().enumerate().take(snap.steps) {
            let filled = if v >= 0.0 {
                lv >= -row_span / 2.0 && lv <= v
            } else {
                lv <= row_span / 2.0 && lv >= v
            };
            let glyph = if filled {
                "█"
            } else if row == drone_row {
                "─"
            } else {
                " "
            };

            let mut style = Style::default().fg(if snap.active[step] {
                Color::Cyan
            } else {
                Color::DarkGray
            });
            if !filled && row == drone_row {
                style = Style::default().fg(Color::Magenta);
            }
            if snap.current_step == Some(step) && filled {
                style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }

            spans.push(Span::styled(glyph.repeat(bar_width), style));
            spans.push(Span::raw(" ".repeat(col_width - bar_width)));
        }
        lines.push(Line::from(spans));
    }

    // Step markers row
    let mut markers = Vec::with_capacity(snap.steps);
    for step in 0..snap.steps {
        let mark = if snap.current_step == Some(step) { "▲" } else { "·" };
        let style = if snap.current_step == Some(step) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        markers.push(Span::styled(
            format!("{:<width$}", mark, width = col_width),
            style,
        ));
    }
    lines.push(Line::from(markers));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the parameter and preference readout
pub fn render_params(frame: &mut Frame, area: Rect, state: &UiStateUpdate) {
    let block = Block::default().title(" Parameters ").borders(Borders::ALL);
    let snap = &state.snapshot;

    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let row = |name: &'static str, text: String| {
        Line::from(vec![
            Span::styled(format!("{:<10}", name), label),
            Span::styled(text, value),
        ])
    };

    let filter = match snap.filter_type {
        FilterType::Euclidean => format!(
            "{} {:+.2} rot {}",
            snap.filter_type.label(),
            snap.filter_value,
            snap.filter_offset
        ),
        FilterType::NoiseThreshold => {
            format!("{} {:+.2}", snap.filter_type.label(), snap.filter_value)
        }
    };

    let mut lines = vec![
        row("position", format!("{:.2}", snap.base_position)),
        row("variance", format!("{:.2}", snap.variance)),
        row(
            "drift",
            format!("{:+.2} {}", snap.drift_amount, snap.drift_type.label()),
        ),
        row("speed", format!("{:.2}x", snap.drift_speed)),
        row("filter", filter),
        row("amplitude", format!("{:.2}", snap.amplitude)),
        row("range", snap.voltage_scale.label().to_string()),
        Line::from(""),
    ];

    for (i, pref) in Preference::ALL.iter().enumerate() {
        let on = snap.preferences.get(*pref);
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", i + 1), label),
            Span::styled(
                if on { "● " } else { "○ " },
                Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
            ),
            Span::styled(pref.label(), value),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
