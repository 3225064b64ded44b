use std::sync::atomic::{AtomicU32, Ordering};

/// A single `f32` stage setting shared between the control thread (writer)
/// and the audio thread (reader).
///
/// Each cell is written by exactly one producer and read once per render
/// quantum. A write is one atomic store, so a reader sees either the old or
/// the new value, never a torn one.
#[derive(Debug)]
pub struct ParamCell(AtomicU32);

impl ParamCell {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}
