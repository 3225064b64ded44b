//! Distortion curves for the waveshaper stage.
//!
//! The waveshaper does not compute a nonlinearity per sample. Instead a
//! transfer table is generated once per drive change, and each input sample
//! in [-1, 1] is mapped through it with linear interpolation.
//!
//! # The curve
//!
//! For a drive amount `d` in [0, 100], let `k = 10 d`. Table entry `i` of `n`
//! stands for the input `x = 2i/n - 1` and holds
//!
//!   (3 + k) * x * 20 * (π/180) / (π + k|x|)
//!
//! At `d = 0` this collapses to a straight line through the origin with slope
//! 1/3, so the stage only scales. As `k` grows, the `k|x|` term in the
//! denominator flattens the ends of the line into a soft knee and the shaped
//! signal picks up odd harmonics.

use std::f64::consts::PI;

/// Table length used by the waveshaper stage unless configured otherwise.
pub const DEFAULT_CURVE_LEN: usize = 44_100;

/// Build the transfer table for a drive `amount` in [0, 100].
///
/// Pure: the same `amount` and `len` always give the same table.
pub fn make_distortion_curve(amount: f32, len: usize) -> Vec<f32> {
    let k = f64::from(amount) * 10.0;
    let n = len as f64;
    let deg = PI / 180.0;

    (0..len)
        .map(|i| {
            let x = (i as f64) * 2.0 / n - 1.0;
            ((3.0 + k) * x * 20.0 * deg / (PI + k * x.abs())) as f32
        })
        .collect()
}

/// Map one sample through `curve`, interpolating between table entries.
///
/// Inputs at or beyond the ends of [-1, 1] take the first/last entry.
#[inline]
pub fn shape_sample(curve: &[f32], input: f32) -> f32 {
    let len = curve.len();
    match len {
        0 => return input,
        1 => return curve[0],
        _ => {}
    }

    let last = len - 1;
    let v = (last as f32) * 0.5 * (input + 1.0);
    if !(v > 0.0) {
        return curve[0];
    }
    if v >= last as f32 {
        return curve[last];
    }

    let index = v.floor();
    let frac = v - index;
    let index = index as usize;
    curve[index] + (curve[index + 1] - curve[index]) * frac
}

/// Shape a whole buffer in place.
pub fn shape_buffer(buffer: &mut [f32], curve: &[f32]) {
    for sample in buffer.iter_mut() {
        *sample = shape_sample(curve, *sample);
    }
}
