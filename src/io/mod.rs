//! The file-in / file-out collaborators: decoded sample buffers, the decoder
//! seam, and WAV support for both directions.

use std::future::Future;

use crate::Result;

pub mod wav;

pub use wav::{WavDecoder, WavSink};

/// Mono audio at its own sample rate, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: f32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f64 / f64::from(self.sample_rate)
        } else {
            0.0
        }
    }
}

/// What a decoder hands back for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: f32,
    pub duration_seconds: f64,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        let buffer = SampleBuffer::new(samples, sample_rate);
        let duration_seconds = buffer.duration_seconds();
        Self {
            samples: buffer.samples,
            sample_rate,
            duration_seconds,
        }
    }

    pub fn into_buffer(self) -> SampleBuffer {
        SampleBuffer::new(self.samples, self.sample_rate)
    }
}

/// Turns the bytes of an audio file into samples.
///
/// Decoding is the one operation that may take a while, so it is async.
/// Dropping the returned future abandons the decode.
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: Vec<u8>) -> impl Future<Output = Result<DecodedAudio>> + Send;
}
