//! Engine-wide tunables.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_BLOCK_SIZE;

/// Sizes and rates shared by every stage of a session.
///
/// Values mirror the browser audio node defaults the chain is modelled on:
/// 128-frame render quanta, a 2048-point analyser with 0.8 smoothing and a
/// 44100-entry waveshaper table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per processing quantum. Modulation and parameter changes are
    /// picked up at quantum boundaries.
    pub render_quantum: usize,
    /// Analyser transform size; the snapshot has `fft_size / 2` bins.
    pub fft_size: usize,
    /// Analyser smoothing between consecutive snapshots (0 = none).
    pub smoothing_time_constant: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
    /// Waveshaper table length.
    pub curve_len: usize,
    /// Longest delay the delay stage can hold, in seconds.
    pub max_delay_seconds: f32,
    /// Capacity of the capture stream ring, in seconds of audio.
    pub capture_ring_seconds: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            render_quantum: 128,
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            curve_len: 44_100,
            max_delay_seconds: 1.0,
            capture_ring_seconds: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Pull every field back into a usable range.
    pub fn validate(mut self) -> Self {
        let defaults = Self::default();

        if !(self.sample_rate.is_finite() && self.sample_rate >= 8_000.0) {
            self.sample_rate = defaults.sample_rate;
        }
        self.render_quantum = self.render_quantum.clamp(1, MAX_BLOCK_SIZE);
        self.fft_size = self.fft_size.clamp(32, 32_768).next_power_of_two();
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            self.smoothing_time_constant = defaults.smoothing_time_constant;
        }
        if !(self.min_decibels < self.max_decibels) {
            self.min_decibels = defaults.min_decibels;
            self.max_decibels = defaults.max_decibels;
        }
        self.curve_len = self.curve_len.max(2);
        // The delayTime range tops out at 1 s, keep it representable
        if !(self.max_delay_seconds >= 1.0) {
            self.max_delay_seconds = 1.0;
        }
        if !(self.capture_ring_seconds > 0.0) {
            self.capture_ring_seconds = defaults.capture_ring_seconds;
        }
        self
    }

    pub fn max_delay_samples(&self) -> usize {
        (self.max_delay_seconds * self.sample_rate).ceil() as usize + 1
    }

    pub fn capture_ring_len(&self) -> usize {
        ((self.capture_ring_seconds * self.sample_rate) as usize).max(MAX_BLOCK_SIZE)
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }
}
