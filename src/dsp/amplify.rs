//! Constant gain.

/*
Gain
====

    output[i] = input[i] × gain

Used three times in the chain: the output volume, the feedback amount inside
the delay loop, and the wobble depth that scales the LFO into Hz of cutoff
swing. Only the meaning of the number changes:

    volume          0.0 .. 1.0      unitless level
    feedback        0.0 .. 0.95     must stay < 1.0 or the loop never decays
    wobble depth    0.0 .. 2400.0   Hz of cutoff modulation per unit of LFO
*/

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}
