//! Spectrum analysis for the tap point.
//!
//! Mirrors the behaviour of a browser `AnalyserNode`: the most recent
//! `fft_size` samples are Blackman-windowed, transformed, normalised by the
//! transform size and smoothed against the previous snapshot before being
//! converted to decibels.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::config::EngineConfig;

/// Floor used before taking logarithms so silence maps to a finite dB.
const MIN_MAGNITUDE: f32 = 1e-12;

pub struct SpectrumAnalyser {
    /// FFT processor
    fft: Arc<dyn Fft<f32>>,
    /// Blackman window coefficients
    window: Vec<f32>,
    /// Circular time-domain history, `fft_size` long
    history: Vec<f32>,
    history_pos: usize,
    /// Transform buffer
    buffer: Vec<Complex<f32>>,
    /// Scratch space for the in-place transform
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitude per bin
    smoothed: Vec<f32>,
    /// Last computed snapshot in dB per bin
    decibels: Vec<f32>,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
    /// New samples arrived since the last snapshot
    dirty: bool,
}

impl SpectrumAnalyser {
    pub fn new(fft_size: usize, smoothing: f32, min_decibels: f32, max_decibels: f32) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let bins = fft_size / 2;

        Self {
            fft,
            window: blackman_window(fft_size),
            history: vec![0.0; fft_size],
            history_pos: 0,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            smoothed: vec![0.0; bins],
            decibels: vec![to_decibels(0.0); bins],
            smoothing: smoothing.clamp(0.0, 1.0),
            min_decibels,
            max_decibels,
            dirty: false,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.fft_size,
            config.smoothing_time_constant,
            config.min_decibels,
            config.max_decibels,
        )
    }

    pub fn fft_size(&self) -> usize {
        self.history.len()
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize, sample_rate: f32) -> f32 {
        bin as f32 * sample_rate / self.fft_size() as f32
    }

    /// Append time-domain samples; only the newest `fft_size` are kept.
    pub fn push_samples(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }
        let len = self.history.len();
        for &sample in samples {
            self.history[self.history_pos] = sample;
            self.history_pos = (self.history_pos + 1) % len;
        }
        self.dirty = true;
    }

    /// Magnitude per bin in dB.
    ///
    /// Recomputed only when new samples arrived, so reading it repeatedly
    /// returns the same snapshot.
    pub fn frequency_data(&mut self) -> &[f32] {
        if self.dirty {
            self.analyse();
            self.dirty = false;
        }
        &self.decibels
    }

    /// Magnitude per bin scaled so `[min_decibels, max_decibels]` spans 0..=255.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        let (min_db, max_db) = (self.min_decibels, self.max_decibels);
        let scale = 255.0 / (max_db - min_db);
        let data = self.frequency_data();

        for (byte, &db) in out.iter_mut().zip(data.iter()) {
            *byte = ((db - min_db) * scale).floor().clamp(0.0, 255.0) as u8;
        }
    }

    /// Copy the newest `fft_size` samples, oldest first.
    pub fn time_domain_data(&self, out: &mut [f32]) {
        let len = self.history.len();
        for (i, slot) in out.iter_mut().take(len).enumerate() {
            *slot = self.history[(self.history_pos + i) % len];
        }
    }

    fn analyse(&mut self) {
        let len = self.history.len();
        for i in 0..len {
            let sample = self.history[(self.history_pos + i) % len];
            self.buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let norm = 1.0 / len as f32;
        let tau = self.smoothing;
        for (bin, (smoothed, db)) in self
            .smoothed
            .iter_mut()
            .zip(self.decibels.iter_mut())
            .enumerate()
        {
            let magnitude = self.buffer[bin].norm() * norm;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }
            *db = to_decibels(*smoothed);
        }
    }
}

#[inline]
fn to_decibels(magnitude: f32) -> f32 {
    20.0 * magnitude.max(MIN_MAGNITUDE).log10()
}

fn blackman_window(len: usize) -> Vec<f32> {
    use std::f32::consts::TAU;
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;

    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            A0 - A1 * (TAU * t).cos() + A2 * (2.0 * TAU * t).cos()
        })
        .collect()
}
