use std::sync::{
    atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::EngineConfig,
    dsp::spectrum::SpectrumAnalyser,
    graph::node::{GraphNode, RenderCtx},
    Error, Result,
};

/*
Analyser Stage and Tap Point
============================

The analyser sits between the delay and the output volume and passes audio
through untouched. Everything it sees is also copied out of the audio thread:

  [AnalyserNode] ──history window──→ [TapPoint] → frequency snapshots
                 ──capture ring────→ [TapStream] → recorder

The two consumers want different things, so they get different channels.

The visualizer wants "what is playing now". The history window is a fixed
`fft_size` ring of atomics plus a write counter; the audio side always
overwrites the oldest sample, so however long the visualizer sleeps, the
next snapshot transforms the newest `fft_size` samples. A snapshot taken
while a block is being written may mix a few samples of the old and new
block, which is harmless for a display.

The recorder wants every sample, in order. The capture ring is an rtrb
queue; when it is full the newest sample is dropped and counted so the
recorder can report the gap.

The control side gets a `TapPoint`. Snapshots are computed lazily, so the
visualizer can ask as often as it likes; asking twice with no new audio
returns the same snapshot. The capture stream only receives samples while
it is checked out with `open_stream`.

The tap reads ahead of the volume stage: captures and snapshots are taken
at pre-volume level, so turning the volume down does not blank either.

  let (analyser, mut tap) = AnalyserNode::new(&config);
  let bins = tap.frequency_snapshot();   // dB per bin
  let stream = tap.open_stream()?;      // hand to the recorder
*/

/// The newest `len` samples the analyser has seen.
///
/// Single writer (the audio thread), any number of readers.
struct HistoryWindow {
    samples: Box<[AtomicU32]>,
    /// Total samples ever written
    written: AtomicU64,
}

impl HistoryWindow {
    fn new(len: usize) -> Self {
        Self {
            samples: (0..len.max(1)).map(|_| AtomicU32::new(0)).collect(),
            written: AtomicU64::new(0),
        }
    }

    fn write(&self, block: &[f32]) {
        let len = self.samples.len() as u64;
        let start = self.written.load(Ordering::Relaxed);
        // Only the tail of an oversized block can survive
        let skip = block.len().saturating_sub(self.samples.len());
        let mut pos = start + skip as u64;
        for &sample in &block[skip..] {
            self.samples[(pos % len) as usize].store(sample.to_bits(), Ordering::Relaxed);
            pos += 1;
        }
        self.written.store(start + block.len() as u64, Ordering::Release);
    }

    fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Copy the window into `out`, oldest first.
    fn read(&self, out: &mut [f32]) -> u64 {
        let written = self.written();
        let len = self.samples.len() as u64;
        for (i, slot) in out.iter_mut().take(self.samples.len()).enumerate() {
            let index = (written + i as u64) % len;
            *slot = f32::from_bits(self.samples[index as usize].load(Ordering::Relaxed));
        }
        written
    }
}

/// State shared between the analyser and whoever holds the capture stream.
#[derive(Debug, Default)]
struct CaptureShared {
    armed: AtomicBool,
    dropped: AtomicU64,
}

pub struct AnalyserNode {
    history: Arc<HistoryWindow>,
    capture_tx: Producer<f32>,
    capture: Arc<CaptureShared>,
}

impl AnalyserNode {
    pub fn new(config: &EngineConfig) -> (Self, TapPoint) {
        let history = Arc::new(HistoryWindow::new(config.fft_size));
        let (capture_tx, capture_rx) = RingBuffer::<f32>::new(config.capture_ring_len());
        let capture = Arc::new(CaptureShared::default());

        let node = Self {
            history: Arc::clone(&history),
            capture_tx,
            capture: Arc::clone(&capture),
        };
        let tap = TapPoint {
            analyser: SpectrumAnalyser::from_config(config),
            window: vec![0.0; config.fft_size],
            history,
            seen: 0,
            capture_rx: Some(capture_rx),
            capture,
            sample_rate: config.sample_rate,
        };

        (node, tap)
    }
}

impl GraphNode for AnalyserNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.history.write(out);

        if self.capture.armed.load(Ordering::Acquire) {
            let mut dropped = 0;
            for &sample in out.iter() {
                if self.capture_tx.push(sample).is_err() {
                    dropped += 1;
                }
            }
            if dropped > 0 {
                self.capture.dropped.fetch_add(dropped, Ordering::Relaxed);
            }
        }
    }
}

/// Read-only view of the processed signal for the visualizer and recorder.
///
/// Reads the analyser stage, which comes before the output volume: every
/// snapshot and every captured sample is at pre-volume level.
pub struct TapPoint {
    analyser: SpectrumAnalyser,
    /// Scratch copy of the history window
    window: Vec<f32>,
    history: Arc<HistoryWindow>,
    /// Write counter at the last refresh
    seen: u64,
    /// `None` while the stream is checked out
    capture_rx: Option<Consumer<f32>>,
    capture: Arc<CaptureShared>,
    sample_rate: f32,
}

impl TapPoint {
    pub fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count()
    }

    pub fn fft_size(&self) -> usize {
        self.analyser.fft_size()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        self.analyser.bin_frequency(bin, self.sample_rate)
    }

    /// Load the newest `fft_size` samples if anything was written since the
    /// last refresh.
    fn refresh(&mut self) {
        if self.history.written() == self.seen {
            return;
        }
        self.seen = self.history.read(&mut self.window);
        self.analyser.push_samples(&self.window);
    }

    /// Magnitude per bin in dB, one entry per frequency bin.
    pub fn frequency_snapshot(&mut self) -> &[f32] {
        self.refresh();
        self.analyser.frequency_data()
    }

    /// Magnitudes scaled to 0..=255 over the configured dB window.
    ///
    /// Writes at most `out.len()` bins.
    pub fn byte_frequency_snapshot(&mut self, out: &mut [u8]) {
        self.refresh();
        self.analyser.byte_frequency_data(out);
    }

    /// Most recent time-domain samples, oldest first.
    pub fn waveform_snapshot(&mut self, out: &mut [f32]) {
        self.refresh();
        self.analyser.time_domain_data(out);
    }

    pub fn is_streaming(&self) -> bool {
        self.capture_rx.is_none()
    }

    /// Check out the continuous capture stream.
    ///
    /// Fails with `CaptureStart` while the stream is already checked out.
    pub fn open_stream(&mut self) -> Result<TapStream> {
        let mut rx = self
            .capture_rx
            .take()
            .ok_or_else(|| Error::CaptureStart("tap stream already in use".into()))?;

        // Discard anything left over from a previous capture
        let stale = rx.slots();
        if let Ok(chunk) = rx.read_chunk(stale) {
            chunk.commit_all();
        }
        self.capture.dropped.store(0, Ordering::Relaxed);
        self.capture.armed.store(true, Ordering::Release);

        Ok(TapStream {
            rx,
            capture: Arc::clone(&self.capture),
        })
    }

    /// Return a stream taken with `open_stream`; the analyser stops feeding it.
    pub fn close_stream(&mut self, stream: TapStream) {
        self.capture.armed.store(false, Ordering::Release);
        self.capture_rx = Some(stream.rx);
    }
}

/// The processed signal as a continuous sample stream.
pub struct TapStream {
    rx: Consumer<f32>,
    capture: Arc<CaptureShared>,
}

impl TapStream {
    /// Move every available sample into `out`; returns how many were read.
    pub fn drain_into(&mut self, out: &mut Vec<f32>) -> usize {
        let available = self.rx.slots();
        if available == 0 {
            return 0;
        }
        match self.rx.read_chunk(available) {
            Ok(chunk) => {
                let (first, second) = chunk.as_slices();
                out.extend_from_slice(first);
                out.extend_from_slice(second);
                chunk.commit_all();
                available
            }
            Err(_) => 0,
        }
    }

    /// Samples lost to a full ring since the stream was opened.
    pub fn dropped(&self) -> u64 {
        self.capture.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig {
            fft_size: 256,
            ..EngineConfig::default()
        }
    }

    fn sine_block(len: usize, freq: f32, sample_rate: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_passes_audio_through() {
        let (mut node, _tap) = AnalyserNode::new(&config());
        let input = sine_block(128, 440.0, 48_000.0);
        let mut buffer = input.clone();
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0));
        assert_eq!(buffer, input);
    }

    #[test]
    fn test_snapshot_is_stable_without_new_audio() {
        let (mut node, mut tap) = AnalyserNode::new(&config());
        let mut buffer = sine_block(256, 3_000.0, 48_000.0);
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0));

        let first = tap.frequency_snapshot().to_vec();
        let second = tap.frequency_snapshot().to_vec();
        assert_eq!(first.len(), 128);
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_peaks_near_input_frequency() {
        let (mut node, mut tap) = AnalyserNode::new(&config());
        let sample_rate = 48_000.0;
        // Bin 16 of a 256-point transform at 48 kHz is 3000 Hz
        let mut buffer = sine_block(256, 3_000.0, sample_rate);
        node.render_block(&mut buffer, &RenderCtx::new(sample_rate));

        let snapshot = tap.frequency_snapshot();
        let peak = snapshot
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &db)| if db > best.1 { (i, db) } else { best })
            .0;
        assert!((15..=17).contains(&peak), "peak at bin {}", peak);
    }

    #[test]
    fn test_snapshot_tracks_newest_audio_after_long_gap() {
        let (mut node, mut tap) = AnalyserNode::new(&config());
        let ctx = RenderCtx::new(48_000.0);

        // Many windows of silence with nobody reading the tap
        for _ in 0..32 {
            let mut buffer = vec![0.0; 256];
            node.render_block(&mut buffer, &ctx);
        }
        let tone = sine_block(256, 3_000.0, 48_000.0);
        let mut buffer = tone.clone();
        node.render_block(&mut buffer, &ctx);

        let mut waveform = vec![0.0; 256];
        tap.waveform_snapshot(&mut waveform);
        assert_eq!(waveform, tone);

        let snapshot = tap.frequency_snapshot();
        let peak = snapshot
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &db)| if db > best.1 { (i, db) } else { best })
            .0;
        assert!((15..=17).contains(&peak), "peak at bin {}", peak);
    }

    #[test]
    fn test_history_keeps_tail_of_oversized_block() {
        let (mut node, mut tap) = AnalyserNode::new(&config());
        let block: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let mut buffer = block.clone();
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0));

        let mut waveform = vec![0.0; 256];
        tap.waveform_snapshot(&mut waveform);
        assert_eq!(waveform, block[1000 - 256..]);
    }

    #[test]
    fn test_partial_history_is_zero_padded_in_order() {
        let (mut node, mut tap) = AnalyserNode::new(&config());
        let ctx = RenderCtx::new(48_000.0);
        let mut first = vec![1.0; 100];
        node.render_block(&mut first, &ctx);
        let mut second = vec![2.0; 100];
        node.render_block(&mut second, &ctx);

        let mut waveform = vec![0.0; 256];
        tap.waveform_snapshot(&mut waveform);
        assert!(waveform[..56].iter().all(|&s| s == 0.0));
        assert!(waveform[56..156].iter().all(|&s| s == 1.0));
        assert!(waveform[156..].iter().all(|&s| s == 2.0));
    }

    #[test]
    fn test_stream_only_fed_while_open() {
        let (mut node, mut tap) = AnalyserNode::new(&config());
        let ctx = RenderCtx::new(48_000.0);

        let mut buffer = vec![0.25; 64];
        node.render_block(&mut buffer, &ctx);

        let mut stream = tap.open_stream().unwrap();
        assert!(tap.is_streaming());
        let mut buffer = vec![0.5; 64];
        node.render_block(&mut buffer, &ctx);

        let mut captured = Vec::new();
        assert_eq!(stream.drain_into(&mut captured), 64);
        assert!(captured.iter().all(|&s| s == 0.5));

        tap.close_stream(stream);
        let mut buffer = vec![0.75; 64];
        node.render_block(&mut buffer, &ctx);

        let mut stream = tap.open_stream().unwrap();
        let mut captured = Vec::new();
        assert_eq!(stream.drain_into(&mut captured), 0);
        tap.close_stream(stream);
    }

    #[test]
    fn test_second_open_is_rejected() {
        let (_node, mut tap) = AnalyserNode::new(&config());
        let _stream = tap.open_stream().unwrap();
        assert!(matches!(tap.open_stream(), Err(Error::CaptureStart(_))));
    }

    #[test]
    fn test_full_ring_counts_drops() {
        let config = config();
        let (mut node, mut tap) = AnalyserNode::new(&config);
        let stream = tap.open_stream().unwrap();

        let capacity = config.capture_ring_len();
        let mut buffer = vec![0.1; capacity + 50];
        node.render_block(&mut buffer, &RenderCtx::new(config.sample_rate));

        assert_eq!(stream.dropped(), 50);
    }
}
