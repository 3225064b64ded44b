//! TUI rendering for wubfx
//!
//! Everything here draws from a borrowed `View`; no widget touches the session.

mod params;
mod spectrum;
mod transport;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use wubfx::{transport::TransportState, ParameterVector};

pub use spectrum::SpectrumView;

use params::render_params;
use spectrum::render_spectrum;
use transport::render_transport;
use waveform::render_waveform;

/// One frame's worth of session state.
pub struct View<'a> {
    pub source: &'a str,
    pub state: TransportState,
    pub elapsed: f64,
    pub duration: f64,
    pub capturing: bool,
    pub parameters: &'a ParameterVector,
    pub selected: usize,
    pub spectrum: &'a [(f64, f64)],
    pub waveform: &'a [f32],
    pub status: &'a str,
}

pub fn render(frame: &mut Frame, view: &View) {
    let area = frame.area();

    // Main layout: transport, body, waveform, help
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(11),   // Parameters + spectrum
            Constraint::Length(8), // Waveform
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(rows[1]);

    render_transport(frame, rows[0], view);
    render_params(frame, body[0], view.parameters, view.selected);
    render_spectrum(frame, body[1], view.spectrum);
    render_waveform(frame, rows[2], view.waveform);

    let help = Paragraph::new(
        " [Q] Quit  [Space] Play/Pause  [S] Stop  [1-4] Preset  [↑↓] Select  [←→] Adjust  [R] Record",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[3]);
}
