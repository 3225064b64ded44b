//! Benchmarks for the tap point's spectrum analysis.

use std::hint::black_box;

use criterion::Criterion;
use wubfx::{dsp::spectrum::SpectrumAnalyser, EngineConfig};

pub fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/spectrum");
    let config = EngineConfig::default();

    // One visualizer tick: ~800 new samples at 60fps, then a snapshot
    let input: Vec<f32> = (0..800).map(|i| (i as f32 * 0.05).sin()).collect();
    let mut analyser = SpectrumAnalyser::from_config(&config);
    let mut bytes = vec![0u8; config.frequency_bin_count()];

    group.bench_function("tick_2048", |b| {
        b.iter(|| {
            analyser.push_samples(black_box(&input));
            analyser.byte_frequency_data(black_box(&mut bytes));
        })
    });

    group.finish();
}
