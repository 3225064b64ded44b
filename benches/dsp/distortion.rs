//! Benchmarks for the waveshaper table: building it and shaping through it.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wubfx::dsp::distortion::{make_distortion_curve, shape_buffer, DEFAULT_CURVE_LEN};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    // Runs on the control thread on every drive change
    group.bench_function("make_curve", |b| {
        b.iter(|| make_distortion_curve(black_box(60.0), black_box(DEFAULT_CURVE_LEN)))
    });

    let curve = make_distortion_curve(60.0, DEFAULT_CURVE_LEN);
    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.1).sin())
            .collect();

        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("shape", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                shape_buffer(black_box(&mut buffer), black_box(&curve));
            })
        });
    }

    group.finish();
}
