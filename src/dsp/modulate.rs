//! Block-rate parameter modulation.

/*
Modulation
==========

The wobble is a modulation edge, not an audio edge: the LFO never reaches
the speakers, it moves the filter's cutoff.

    cutoff = base_cutoff + lfo × depth_hz

With the default settings (cutoff 120 Hz, wobbleDepth 0.5 → 1000 Hz of
swing) the cutoff sweeps from -880 Hz to 1120 Hz. The filter clamps the
result to [20, 20000] Hz, so the bottom half of every LFO cycle sits on a
closed filter. That flat spot is part of the "wub": the sound chokes, then
opens.

Block rate
----------

The modulation value is computed once per render quantum (128 frames by
default) from the average of the LFO samples in that quantum. At 48 kHz a
quantum is 2.7 ms; an LFO at 10 Hz moves about 2.7% of a cycle per quantum,
which is smooth enough for a filter sweep and keeps the filter coefficient
update out of the per-sample loop.
*/

/// base + (modulator × depth)
#[inline]
pub fn apply_modulation(base_value: f32, modulator: f32, depth: f32) -> f32 {
    base_value + (modulator * depth)
}

/// Average of a modulator signal over a block; 0.0 for an empty block.
#[inline]
pub fn block_average(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}
