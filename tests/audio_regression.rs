use wubfx::{
    graph::GraphProcessor, io::DecodedAudio, preset::Preset, EngineConfig, Param, Session,
};

fn sine(freq: f32, seconds: f32, sample_rate: f32) -> DecodedAudio {
    let len = (seconds * sample_rate) as usize;
    let samples = (0..len)
        .map(|i| (std::f32::consts::TAU * freq * i as f32 / sample_rate).sin() * 0.8)
        .collect();
    DecodedAudio::new(samples, sample_rate)
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

fn playing_session(config: EngineConfig) -> (Session, GraphProcessor) {
    let mut session = Session::new(config.clone());
    session
        .load_decoded("sine.wav", sine(110.0, 2.0, config.sample_rate))
        .unwrap();
    session.play();
    let processor = session.take_processor().unwrap();
    (session, processor)
}

#[test]
fn renders_bounded_audio_with_default_settings() {
    let (_session, mut processor) = playing_session(EngineConfig::default());
    let mut output = vec![0.0; 48_000];
    processor.render(&mut output);

    // The delay stage is wet only, so sound arrives after delayTime
    assert!(output[..10_000].iter().all(|&s| s == 0.0));
    assert!(output[12_000..].iter().any(|s| s.abs() > 1e-3));
    // Resonance and feedback add gain, but nothing runs away
    assert!(output.iter().all(|s| s.is_finite() && s.abs() < 10.0));
}

#[test]
fn every_preset_stays_finite() {
    for preset in Preset::all() {
        let (mut session, mut processor) = playing_session(EngineConfig::default());
        session.apply_preset(preset.name).unwrap();
        session.set(Param::Distortion, 100.0);

        let mut output = vec![0.0; 4096];
        for _ in 0..12 {
            processor.render(&mut output);
            assert!(
                output.iter().all(|s| s.is_finite()),
                "{} produced non-finite output",
                preset.name
            );
        }
    }
}

#[test]
fn volume_zero_silences_output() {
    let (mut session, mut processor) = playing_session(EngineConfig::default());
    session.set(Param::Volume, 0.0);

    let mut output = vec![1.0; 4096];
    processor.render(&mut output);
    assert!(output.iter().all(|&s| s == 0.0));
}

#[test]
fn tap_reads_ahead_of_the_volume_stage() {
    let (mut session, mut processor) = playing_session(EngineConfig::default());
    session.set(Param::Volume, 0.0);

    let mut output = vec![0.0; 24_000];
    processor.render(&mut output);
    assert!(output.iter().all(|&s| s == 0.0));

    let tap = session.tap().unwrap();
    let mut waveform = vec![0.0; tap.fft_size()];
    tap.waveform_snapshot(&mut waveform);
    assert!(rms(&waveform) > 1e-3);
}

#[test]
fn lower_cutoff_darkens_a_bright_source() {
    // No wobble, so the cutoff stays where it is set
    let bright = |cutoff: f32| {
        let (mut session, mut processor) = playing_session(EngineConfig::default());
        session.set(Param::WobbleDepth, 0.0);
        session.set(Param::DelayFeedback, 0.0);
        session.set(Param::FilterQ, 0.1);
        session.set(Param::FilterCutoff, cutoff);
        let mut output = vec![0.0; 24_000];
        processor.render(&mut output);
        rms(&output[12_000..])
    };

    // 110 Hz source: a 60 Hz cutoff attenuates it, a 10 kHz cutoff lets it through
    assert!(bright(60.0) < bright(10_000.0) * 0.7);
}

#[test]
fn feedback_tail_decays_after_stop() {
    let (mut session, mut processor) = playing_session(EngineConfig::default());
    session.set(Param::DelayFeedback, 0.95);
    session.set(Param::DelayTime, 0.05);

    let mut output = vec![0.0; 24_000];
    processor.render(&mut output);
    session.stop();

    // 0.95 per 50 ms repeat: after 20 s the tail is far below audibility
    for _ in 0..40 {
        processor.render(&mut output);
    }
    assert!(rms(&output) < 1e-3, "tail rms {}", rms(&output));
}

#[test]
fn tap_sees_the_played_signal() {
    let (mut session, mut processor) = playing_session(EngineConfig::default());
    // Past the 0.22 s delay plus one full transform
    let mut output = vec![0.0; 24_000];
    processor.render(&mut output);

    let tap = session.tap().unwrap();
    let bins = tap.frequency_snapshot().to_vec();
    assert_eq!(bins.len(), 1024);

    let peak = bins
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, &db)| if db > best.1 { (i, db) } else { best });
    // 110 Hz lands in bin 4 or 5 of a 2048-point transform at 48 kHz
    assert!(tap.bin_frequency(peak.0) < 400.0, "peak bin {}", peak.0);
    assert!(peak.1 > -100.0);
}
