//! Benchmarks for the complete effects chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wubfx::{io::DecodedAudio, preset::Preset, EngineConfig, Session};

use crate::BLOCK_SIZES;

/// Ten seconds of a 55 Hz saw, a typical wobble bass source.
fn bass_line(sample_rate: f32) -> DecodedAudio {
    let len = (sample_rate * 10.0) as usize;
    let samples = (0..len)
        .map(|i| {
            let phase = (i as f32 * 55.0 / sample_rate).fract();
            phase * 2.0 - 1.0
        })
        .collect();
    DecodedAudio::new(samples, sample_rate)
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    for preset in Preset::all() {
        let config = EngineConfig::default();
        let mut session = Session::new(config.clone());
        session
            .load_decoded("bass.wav", bass_line(config.sample_rate))
            .expect("load");
        session.apply_preset(preset.name).expect("preset");
        session.play();
        let mut processor = session.take_processor().expect("processor");

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(preset.name, size), &size, |b, _| {
                b.iter(|| {
                    processor.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
