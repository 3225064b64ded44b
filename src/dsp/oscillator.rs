use std::f32::consts::TAU;

/// Sine phase accumulator.
///
/// The phase is kept in cycles (0.0..1.0) so it never loses precision no
/// matter how long the oscillator has been running.
pub struct OscillatorBlock {
    phase: f32,
}

impl OscillatorBlock {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = (self.phase * TAU).sin();
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        out
    }

    /// Fill `destination` with a sine at `frequency` Hz, continuing from the
    /// current phase.
    pub fn render(&mut self, destination: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in destination.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Default for OscillatorBlock {
    fn default() -> Self {
        Self::new()
    }
}
