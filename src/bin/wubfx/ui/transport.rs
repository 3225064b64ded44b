//! Transport bar widget - shows file, play state, position and capture

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wubfx::transport::TransportState;

use super::View;

fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" wubfx ").borders(Borders::ALL);

    let (symbol, label, color) = match view.state {
        TransportState::Idle => ("·", "Idle", Color::DarkGray),
        TransportState::Ready => ("⏸", "Ready", Color::Yellow),
        TransportState::Playing => ("▶", "Playing", Color::Green),
    };

    let mut spans = vec![
        Span::styled(format!(" {}  ", view.source), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{} {}  ", symbol, label), Style::default().fg(color)),
        Span::styled(
            format!("{} / {}  ", clock(view.elapsed), clock(view.duration)),
            Style::default().fg(Color::White),
        ),
    ];
    if view.capturing {
        spans.push(Span::styled("● REC  ", Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled(
        view.status.to_string(),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
