/// Circular delay line.
///
/// `write_pos` always points at the slot the next input goes into, so a read
/// of `n` samples back (`n >= 1`) sees audio that has already left the
/// current sample. That one-sample minimum is what keeps a feedback loop
/// closed around the line from ever being instantaneous.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// `capacity` is the number of past samples that can be recalled.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(3)],
            write_pos: 0,
        }
    }

    #[inline]
    fn at(&self, samples_back: usize) -> f32 {
        let len = self.buffer.len();
        self.buffer[(self.write_pos + len - samples_back) % len]
    }

    /// Read `delay` samples into the past, linearly interpolated.
    ///
    /// Clamped to `[1, capacity - 2]`.
    #[inline]
    pub fn read_interpolated(&self, delay: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let delay = if delay.is_finite() { delay.clamp(1.0, max) } else { 1.0 };
        let whole = delay.floor();
        let frac = delay - whole;
        let whole = whole as usize;

        let a = self.at(whole);
        let b = self.at(whole + 1);
        a + (b - a) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// One step of a feedback delay: returns the delayed sample and writes
    /// `input + delayed * feedback` back into the line.
    #[inline]
    pub fn next_sample(&mut self, input: f32, delay: f32, feedback: f32) -> f32 {
        let delayed = self.read_interpolated(delay);
        self.write(input + delayed * feedback);
        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay: f32, feedback: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay, feedback);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(delay: f32, feedback: f32, len: usize) -> Vec<f32> {
        let mut line = DelayLine::new(1000);
        let mut buffer = vec![0.0; len];
        buffer[0] = 1.0;
        line.render(&mut buffer, delay, feedback);
        buffer
    }

    #[test]
    fn test_impulse_appears_after_delay() {
        let out = impulse_response(10.0, 0.0, 32);

        for (i, &s) in out.iter().enumerate() {
            let expected = if i == 10 { 1.0 } else { 0.0 };
            assert!((s - expected).abs() < 1e-6, "sample {} was {}", i, s);
        }
    }

    #[test]
    fn test_feedback_repeats_decay() {
        let out = impulse_response(10.0, 0.5, 40);

        assert!((out[10] - 1.0).abs() < 1e-6);
        assert!((out[20] - 0.5).abs() < 1e-6);
        assert!((out[30] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_zero_delay_still_has_one_sample_latency() {
        let out = impulse_response(0.0, 0.0, 4);

        assert_eq!(out[0], 0.0);
        assert!((out[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let out = impulse_response(2.5, 0.0, 8);

        assert!((out[2] - 0.5).abs() < 1e-6);
        assert!((out[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_feedback_below_one_decays() {
        let out = impulse_response(1.0, 0.95, 20_000);
        let tail = out[19_000..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(tail < 1e-3, "tail should have decayed, got {}", tail);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut line = DelayLine::new(100);
        line.write(1.0);
        line.reset();
        assert_eq!(line.read_interpolated(1.0), 0.0);
    }
}
