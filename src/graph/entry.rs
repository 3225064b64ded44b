use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use arc_swap::ArcSwapOption;

use crate::{
    graph::{
        node::{GraphNode, RenderCtx},
        param::ParamCell,
    },
    io::SampleBuffer,
};

/*
Entry Point and Playback Units
==============================

The chain has exactly one entry point. A playback unit is one pass of the
session's sample buffer through it: created when playback starts, thrown
away on pause, stop or reload. It is never restarted; resuming creates a
new unit with a start offset.

    Transport ──attach/detach──→ [EntryPort]     (control side)
                                     │ slot
                                     ▼
                                 [EntryNode] ──→ filter ...   (audio side)

The slot holds at most one unit. Attaching swaps the new unit in and hands
the old one back already disconnected, so two units never feed the chain
in the same quantum. An empty slot renders silence.

Playback rate is read once per quantum. A buffer recorded at a different
sample rate is resampled on the fly with linear interpolation.
*/

/// One use of a sample buffer, from start offset to end (or teardown).
#[derive(Debug)]
pub struct PlaybackUnit {
    id: u64,
    buffer: Arc<SampleBuffer>,
    rate: ParamCell,
    /// Read position in buffer frames, stored as `f64` bits
    position: AtomicU64,
    connected: AtomicBool,
    ended: AtomicBool,
}

impl PlaybackUnit {
    pub fn new(id: u64, buffer: Arc<SampleBuffer>, offset_seconds: f64, rate: f32) -> Self {
        let position = offset_seconds.max(0.0) * f64::from(buffer.sample_rate());
        Self {
            id,
            buffer,
            rate: ParamCell::new(rate),
            position: AtomicU64::new(position.to_bits()),
            connected: AtomicBool::new(true),
            ended: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn rate(&self) -> f32 {
        self.rate.get()
    }

    pub fn set_rate(&self, rate: f32) {
        self.rate.set(rate);
    }

    /// Seconds of the buffer consumed so far.
    pub fn position_seconds(&self) -> f64 {
        let frames = f64::from_bits(self.position.load(Ordering::Relaxed));
        frames / f64::from(self.buffer.sample_rate())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// True once the read position ran off the end of the buffer.
    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    fn render(&self, out: &mut [f32], ctx: &RenderCtx) {
        let samples = self.buffer.samples();
        let len = samples.len();
        let step = f64::from(self.rate.get()) * f64::from(self.buffer.sample_rate())
            / f64::from(ctx.sample_rate);
        let mut position = f64::from_bits(self.position.load(Ordering::Relaxed));

        for sample in out.iter_mut() {
            let index = position as usize;
            if index >= len {
                *sample = 0.0;
                continue;
            }
            let frac = (position - index as f64) as f32;
            let a = samples[index];
            let b = if index + 1 < len { samples[index + 1] } else { 0.0 };
            *sample = a + (b - a) * frac;
            position += step;
        }

        self.position.store(position.to_bits(), Ordering::Relaxed);
        if position as usize >= len {
            self.ended.store(true, Ordering::Release);
        }
    }
}

type PlaybackSlot = Arc<ArcSwapOption<PlaybackUnit>>;

/// Audio side of the entry point.
pub struct EntryNode {
    slot: PlaybackSlot,
}

impl EntryNode {
    pub fn new() -> (Self, EntryPort) {
        let slot: PlaybackSlot = Arc::new(ArcSwapOption::empty());
        (
            Self {
                slot: Arc::clone(&slot),
            },
            EntryPort { slot },
        )
    }
}

impl GraphNode for EntryNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let unit = self.slot.load();
        match unit.as_deref() {
            Some(unit) if unit.is_connected() => unit.render(out, ctx),
            _ => out.fill(0.0),
        }
    }
}

/// Control side of the entry point.
#[derive(Clone)]
pub struct EntryPort {
    slot: PlaybackSlot,
}

impl EntryPort {
    /// Put `unit` in the slot and return whatever was there, disconnected.
    pub fn attach(&self, unit: Arc<PlaybackUnit>) -> Option<Arc<PlaybackUnit>> {
        let previous = self.slot.swap(Some(unit));
        if let Some(previous) = &previous {
            previous.disconnect();
        }
        previous
    }

    /// Empty the slot and return the unit that was in it, disconnected.
    pub fn detach(&self) -> Option<Arc<PlaybackUnit>> {
        let previous = self.slot.swap(None);
        if let Some(previous) = &previous {
            previous.disconnect();
        }
        previous
    }

    /// The unit currently feeding the chain, if any.
    pub fn current(&self) -> Option<Arc<PlaybackUnit>> {
        self.slot.load_full()
    }
}
