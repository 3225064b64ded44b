//! Event loop and key handling for the wubfx TUI

use std::{path::PathBuf, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tracing::{info, warn};
use wubfx::{preset::Preset, transport::TransportState, Param, Session};

use super::ui::{self, SpectrumView, View};

pub struct App {
    session: Session,
    capture_dir: PathBuf,
    /// Index into `Param::ALL`
    selected: usize,
    spectrum: SpectrumView,
    waveform: Vec<f32>,
    /// Last capture or preset message for the status line
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, capture_dir: PathBuf) -> Self {
        let config = session.config();
        let spectrum = SpectrumView::new(config.frequency_bin_count(), config.sample_rate);
        let waveform = vec![0.0; config.fft_size];
        Self {
            session,
            capture_dir,
            selected: 0,
            spectrum,
            waveform,
            status: String::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_tap();
            let state = self.session.state();
            let elapsed = self.session.elapsed();

            let view = View {
                source: self.session.source().unwrap_or("-"),
                state,
                elapsed,
                duration: self.session.duration(),
                capturing: self.session.is_capturing(),
                parameters: self.session.parameters(),
                selected: self.selected,
                spectrum: self.spectrum.data(),
                waveform: &self.waveform,
                status: &self.status,
            };
            terminal.draw(|frame| ui::render(frame, &view))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        if self.session.is_capturing() {
            self.toggle_capture();
        }
        Ok(())
    }

    fn poll_tap(&mut self) {
        if let Some(tap) = self.session.tap() {
            tap.waveform_snapshot(&mut self.waveform);
            self.spectrum.update(tap.frequency_snapshot());
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                if self.session.state() == TransportState::Playing {
                    self.session.pause();
                } else {
                    self.session.play();
                }
            }
            KeyCode::Char('s') => self.session.stop(),
            KeyCode::Char('r') => self.toggle_capture(),
            KeyCode::Char(c @ '1'..='9') => self.select_preset(c),
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(Param::ALL.len() - 1);
            }
            KeyCode::Down => self.selected = (self.selected + 1) % Param::ALL.len(),
            KeyCode::Left => self.nudge(-1.0),
            KeyCode::Right => self.nudge(1.0),
            _ => {}
        }
    }

    fn nudge(&mut self, direction: f32) {
        let param = Param::ALL[self.selected];
        let value = self.session.get(param) + direction * param.spec().step;
        self.session.set(param, value);
    }

    fn select_preset(&mut self, key: char) {
        let index = key.to_digit(10).map_or(0, |d| d as usize).saturating_sub(1);
        let Some(preset) = Preset::all().get(index) else {
            return;
        };
        match self.session.apply_preset(preset.name) {
            Ok(preset) => self.status = format!("preset: {}", preset.name),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn toggle_capture(&mut self) {
        if self.session.is_capturing() {
            match self.session.stop_capture() {
                Ok(summary) => {
                    self.status = format!(
                        "saved {} ({:.1}s)",
                        summary.path.display(),
                        summary.frames as f32 / self.session.config().sample_rate
                    );
                    info!(path = %summary.path.display(), "capture saved");
                }
                Err(e) => {
                    warn!("capture stop failed: {}", e);
                    self.status = e.to_string();
                }
            }
        } else {
            match self.session.start_capture(&self.capture_dir) {
                Ok(path) => self.status = format!("recording to {}", path.display()),
                Err(e) => {
                    warn!("capture start failed: {}", e);
                    self.status = e.to_string();
                }
            }
        }
    }
}
