//! Spectrum analyzer widget
//!
//! Resamples the tap's linear frequency bins onto log-spaced display points.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Number of frequency points to display
const SPECTRUM_POINTS: usize = 64;

/// Floor of the display range in dB
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumView {
    /// Analyser bin index for each display point
    bin_indices: Vec<usize>,
    /// Current spectrum data: (log10 frequency, magnitude_db)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumView {
    /// `bin_count` linear bins spanning 0 Hz to Nyquist at `sample_rate`.
    pub fn new(bin_count: usize, sample_rate: f32) -> Self {
        let bin_count = bin_count.max(1);
        let max_freq = (sample_rate as f64 / 2.0).min(20_000.0).max(1.0);
        let min_freq = 20.0f64.min(max_freq);
        let ratio = max_freq / min_freq;
        let hz_per_bin = sample_rate as f64 / 2.0 / bin_count as f64;

        let mut bin_indices = Vec::with_capacity(SPECTRUM_POINTS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
            let freq = min_freq * ratio.powf(t);
            let index = ((freq / hz_per_bin).round() as usize).min(bin_count - 1);
            bin_indices.push(index);
            spectrum.push((freq.log10(), FLOOR_DB));
        }

        Self {
            bin_indices,
            spectrum,
        }
    }

    /// Pick up a fresh snapshot of per-bin magnitudes in dB.
    pub fn update(&mut self, bins: &[f32]) {
        if bins.is_empty() {
            return;
        }
        for ((_, db), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let value = bins[index.min(bins.len() - 1)] as f64;
            *db = if value.is_finite() {
                value.max(FLOOR_DB)
            } else {
                FLOOR_DB
            };
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum analyzer widget
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let min_x = spectrum.first().map_or(1.3, |(x, _)| *x);
    let max_x = spectrum.last().map_or(4.3, |(x, _)| *x).max(min_x + 0.1);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
