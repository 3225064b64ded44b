//! Playback lifecycle and the elapsed-time projection.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tracing::debug;

use crate::{
    graph::entry::{EntryPort, PlaybackUnit},
    io::SampleBuffer,
};

/*
Transport
=========

    Idle ──load──→ Ready ──play──→ Playing
                     ↑               │
                     └─pause/stop/end┘
    (load from any state → Ready)

Elapsed time is never accumulated. It is projected from two readings of
the audio clock whenever somebody asks:

    elapsed = offset + (now - started_at) × speed_at_start

clamped to [0, duration]. When a speed change arrives mid-playback the
projection is rebased at the current position (offset = elapsed so far,
started_at = now, speed_at_start = new speed), so the projected playhead
stays in step with the samples the unit is actually consuming.

Pause keeps the playhead for the next play; stop rewinds it to 0.
*/

/// A monotonic clock in seconds, advanced by the audio side.
pub trait AudioClock: Send + Sync {
    fn now(&self) -> f64;
}

/// Counts rendered frames; the clock a `GraphProcessor` drives.
#[derive(Debug)]
pub struct FrameClock {
    frames: AtomicU64,
    sample_rate: f32,
}

impl FrameClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Relaxed);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl AudioClock for FrameClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.seconds.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Relaxed))
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    /// Nothing loaded
    Idle,
    /// Loaded, nothing playing
    Ready,
    Playing,
}

struct Loaded {
    buffer: Arc<SampleBuffer>,
    duration: f64,
}

/// Reference points for the elapsed-time projection of the live unit.
#[derive(Clone, Copy, Debug)]
struct Run {
    started_at: f64,
    offset: f64,
    speed_at_start: f64,
}

pub struct Transport {
    clock: Arc<dyn AudioClock>,
    entry: Option<EntryPort>,
    loaded: Option<Loaded>,
    live: Option<Arc<PlaybackUnit>>,
    run: Option<Run>,
    /// Playhead to resume from
    resume_at: f64,
    next_unit_id: u64,
}

impl Transport {
    pub fn new(clock: Arc<dyn AudioClock>) -> Self {
        Self {
            clock,
            entry: None,
            loaded: None,
            live: None,
            run: None,
            resume_at: 0.0,
            next_unit_id: 1,
        }
    }

    /// Bind to the graph's entry point. Until then `play` has nowhere to go.
    pub fn connect(&mut self, entry: EntryPort) {
        self.entry = Some(entry);
    }

    pub fn is_connected(&self) -> bool {
        self.entry.is_some()
    }

    /// Current state. A unit that reached the end of its buffer counts as
    /// stopped.
    pub fn state(&mut self) -> TransportState {
        self.poll_end();
        self.raw_state()
    }

    fn raw_state(&self) -> TransportState {
        match (&self.loaded, &self.live) {
            (None, _) => TransportState::Idle,
            (Some(_), None) => TransportState::Ready,
            (Some(_), Some(_)) => TransportState::Playing,
        }
    }

    pub fn duration(&self) -> f64 {
        self.loaded.as_ref().map_or(0.0, |l| l.duration)
    }

    pub fn buffer(&self) -> Option<&Arc<SampleBuffer>> {
        self.loaded.as_ref().map(|l| &l.buffer)
    }

    /// The unit currently feeding the graph.
    pub fn live_unit(&self) -> Option<&Arc<PlaybackUnit>> {
        self.live.as_ref()
    }

    /// Replace the loaded buffer. Tears down any live unit; the playhead
    /// returns to 0.
    pub fn load(&mut self, buffer: Arc<SampleBuffer>, duration_seconds: f64) {
        self.teardown();
        self.resume_at = 0.0;
        self.loaded = Some(Loaded {
            buffer,
            duration: duration_seconds.max(0.0),
        });
        debug!(duration = duration_seconds, "transport ready");
    }

    /// Start a new playback unit at the playhead.
    ///
    /// A no-op when nothing is loaded or before the graph exists. While
    /// already playing, the live unit is torn down and replaced by a fresh
    /// one at the current playhead. Returns true if a unit was started.
    pub fn play(&mut self, speed: f32) -> bool {
        match self.state() {
            TransportState::Idle => {
                debug!("play ignored, nothing loaded");
                return false;
            }
            TransportState::Playing => {
                self.resume_at = self.elapsed();
                self.teardown();
            }
            TransportState::Ready => {}
        }
        let (Some(entry), Some(loaded)) = (self.entry.clone(), self.loaded.as_ref()) else {
            debug!("play ignored, graph not built");
            return false;
        };
        let buffer = Arc::clone(&loaded.buffer);
        let offset = if self.resume_at >= loaded.duration {
            0.0
        } else {
            self.resume_at
        };

        let unit = Arc::new(PlaybackUnit::new(self.next_unit_id, buffer, offset, speed));
        self.next_unit_id += 1;

        // The slot is empty here; never let two units feed the entry
        if let Some(stray) = entry.attach(Arc::clone(&unit)) {
            debug!(unit = stray.id(), "replaced stray playback unit");
        }
        self.run = Some(Run {
            started_at: self.clock.now(),
            offset,
            speed_at_start: f64::from(speed),
        });
        debug!(unit = unit.id(), offset, speed, "playback started");
        self.live = Some(unit);
        true
    }

    /// Stop playback and keep the playhead for the next `play`.
    pub fn pause(&mut self) {
        if self.state() != TransportState::Playing {
            return;
        }
        self.resume_at = self.elapsed();
        self.teardown();
        debug!(at = self.resume_at, "playback paused");
    }

    /// Stop playback and rewind to the start.
    pub fn stop(&mut self) {
        self.teardown();
        self.resume_at = 0.0;
        debug!("playback stopped");
    }

    /// Apply a new speed to the live unit, if any, and rebase the projection.
    pub fn set_speed(&mut self, speed: f32) {
        let now = self.clock.now();
        if let (Some(unit), Some(run)) = (&self.live, self.run) {
            let position = project(run, now, self.duration());
            unit.set_rate(speed);
            self.run = Some(Run {
                started_at: now,
                offset: position,
                speed_at_start: f64::from(speed),
            });
        }
    }

    /// Playhead in seconds, clamped to [0, duration].
    pub fn elapsed(&mut self) -> f64 {
        self.poll_end();
        match self.run {
            Some(run) if self.live.is_some() => project(run, self.clock.now(), self.duration()),
            _ => self.resume_at.clamp(0.0, self.duration()),
        }
    }

    /// Transition to Ready once the live unit has played out.
    fn poll_end(&mut self) {
        let Some(run) = self.run else {
            return;
        };
        if self.live.is_none() {
            return;
        }
        let duration = self.duration();
        let projected_end = project(run, self.clock.now(), duration) >= duration;
        let drained = self.live.as_ref().is_some_and(|u| u.has_ended());
        if projected_end || drained {
            self.teardown();
            self.resume_at = duration;
            debug!("playback reached end of buffer");
        }
    }

    fn teardown(&mut self) {
        if let Some(unit) = self.live.take() {
            if let Some(entry) = &self.entry {
                entry.detach();
            }
            debug!(unit = unit.id(), "playback unit discarded");
        }
        self.run = None;
    }
}

fn project(run: Run, now: f64, duration: f64) -> f64 {
    let elapsed = run.offset + (now - run.started_at) * run.speed_at_start;
    elapsed.clamp(0.0, duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::entry::EntryNode;

    fn transport() -> (Transport, Arc<ManualClock>, EntryPort) {
        let clock = Arc::new(ManualClock::new());
        let (_node, port) = EntryNode::new();
        let mut transport = Transport::new(clock.clone());
        transport.connect(port.clone());
        (transport, clock, port)
    }

    fn ten_seconds() -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::new(vec![0.0; 1000], 100.0))
    }

    #[test]
    fn play_on_idle_is_noop() {
        let (mut transport, _, port) = transport();
        assert!(!transport.play(1.0));
        assert_eq!(transport.state(), TransportState::Idle);
        assert!(port.current().is_none());
    }

    #[test]
    fn play_pause_play_resumes() {
        let (mut transport, clock, _) = transport();
        transport.load(ten_seconds(), 10.0);
        assert_eq!(transport.state(), TransportState::Ready);

        transport.play(1.0);
        clock.advance(3.0);
        transport.pause();
        assert_eq!(transport.state(), TransportState::Ready);
        assert_eq!(transport.elapsed(), 3.0);

        clock.advance(5.0);
        transport.play(1.0);
        let unit = transport.live_unit().unwrap();
        assert!((unit.position_seconds() - 3.0).abs() < 1e-9);
        clock.advance(1.0);
        assert_eq!(transport.elapsed(), 4.0);
    }

    #[test]
    fn second_play_replaces_the_live_unit() {
        let (mut transport, clock, port) = transport();
        transport.load(ten_seconds(), 10.0);
        transport.play(1.0);
        let first = Arc::clone(transport.live_unit().unwrap());
        clock.advance(1.5);

        assert!(transport.play(1.0));
        let second = Arc::clone(transport.live_unit().unwrap());
        assert!(!first.is_connected());
        assert!(second.is_connected());
        assert_ne!(first.id(), second.id());
        assert_eq!(port.current().map(|u| u.id()), Some(second.id()));
        assert_eq!(transport.elapsed(), 1.5);
    }

    #[test]
    fn stop_rewinds() {
        let (mut transport, clock, _) = transport();
        transport.load(ten_seconds(), 10.0);
        transport.play(1.0);
        clock.advance(2.0);
        transport.stop();
        assert_eq!(transport.elapsed(), 0.0);
    }

    #[test]
    fn elapsed_clamps_and_finishes() {
        let (mut transport, clock, port) = transport();
        transport.load(ten_seconds(), 10.0);
        transport.play(1.0);
        clock.advance(12.0);

        assert_eq!(transport.elapsed(), 10.0);
        assert_eq!(transport.state(), TransportState::Ready);
        assert!(port.current().is_none());
    }

    #[test]
    fn speed_change_rebases_projection() {
        let (mut transport, clock, _) = transport();
        transport.load(ten_seconds(), 10.0);
        transport.play(1.0);
        clock.advance(2.0);

        transport.set_speed(2.0);
        assert_eq!(transport.elapsed(), 2.0);
        assert_eq!(transport.live_unit().unwrap().rate(), 2.0);

        clock.advance(1.0);
        assert_eq!(transport.elapsed(), 4.0);
    }

    #[test]
    fn load_while_playing_goes_ready() {
        let (mut transport, clock, port) = transport();
        transport.load(ten_seconds(), 10.0);
        transport.play(1.0);
        clock.advance(1.0);

        transport.load(ten_seconds(), 10.0);
        assert_eq!(transport.state(), TransportState::Ready);
        assert_eq!(transport.elapsed(), 0.0);
        assert!(port.current().is_none());
    }
}
