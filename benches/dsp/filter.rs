//! Benchmarks for the resonant lowpass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wubfx::dsp::filter::{resonance_db_to_q, SVFilter};
use wubfx::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Gentle resonance
        let mut filter = SVFilter::lowpass(1200.0);
        filter.set_q(resonance_db_to_q(4.0));
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_q4", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Screaming resonance, cutoff moved every block like the wobble does
        let mut filter = SVFilter::lowpass(180.0);
        filter.set_q(resonance_db_to_q(24.0));
        let mut buffer = input.clone();
        let mut block = 0usize;
        group.bench_with_input(BenchmarkId::new("swept_q24", size), &size, |b, _| {
            b.iter(|| {
                block = block.wrapping_add(1);
                filter.set_cutoff(180.0 + (block % 64) as f32 * 30.0);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
