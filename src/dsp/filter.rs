use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

/*
Resonance is given the way browser lowpass filters take it: in decibels of
peak gain at the cutoff. The SVF wants a linear Q, so it is converted once
per parameter change.

| resonance (dB) | linear Q | character            |
| -------------- | -------- | -------------------- |
| 0.1            | 1.01     | flat, gentle rolloff |
| 10             | 3.16     | pronounced peak      |
| 24             | 15.8     | screaming, near self-oscillation |
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
const MIN_Q: f32 = 0.0001;
const MAX_Q: f32 = 1000.0;

/// Convert a resonance given in dB of peak gain to a linear Q.
#[inline]
pub fn resonance_db_to_q(resonance_db: f32) -> f32 {
    10.0_f32.powf(resonance_db / 20.0).clamp(MIN_Q, MAX_Q)
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
            q: std::f32::consts::FRAC_1_SQRT_2,
        }
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        // Keep the prewarped frequency below Nyquist, tan() blows up at fs/2
        let nyquist_guard = 0.49 * ctx.sample_rate;
        let cutoff = self.cutoff_hz.min(nyquist_guard);
        (TAU * cutoff / (2.0 * ctx.sample_rate)).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q.clamp(MIN_Q, MAX_Q);
    }
}
