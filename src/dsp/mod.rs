//! Low-level DSP primitives used by the graph stages.
//!
//! Everything here is allocation-free once constructed and safe to call from
//! the audio thread, except the distortion curve generator and the spectrum
//! analyser, which run on the control side.

/// Constant gain.
pub mod amplify;
/// Circular delay line with a feedback write path.
pub mod delay;
/// Waveshaper transfer curves.
pub mod distortion;
/// Resonant state-variable lowpass.
pub mod filter;
/// Block-rate parameter modulation helpers.
pub mod modulate;
/// Sine phase accumulator for the wobble LFO.
pub mod oscillator;
/// Windowed FFT magnitude analysis.
pub mod spectrum;
