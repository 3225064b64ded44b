use std::{
    fs::File,
    io::{BufWriter, Cursor},
    path::{Path, PathBuf},
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{
    io::{DecodedAudio, Decoder},
    Error, Result,
};

/// Decodes RIFF/WAVE files: 8/16/24/32-bit integer or 32-bit float PCM,
/// any channel count, downmixed to mono.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl Decoder for WavDecoder {
    async fn decode(&self, bytes: Vec<u8>) -> Result<DecodedAudio> {
        tokio::task::spawn_blocking(move || decode_wav(&bytes))
            .await
            .map_err(|e| Error::Decode(format!("decode task failed: {}", e)))?
    }
}

fn decode_error(e: hound::Error) -> Error {
    Error::Decode(e.to_string())
}

/// Decode a complete WAV file held in memory.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(decode_error)?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(Error::Decode("wav header has no channels or sample rate".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(decode_error)?,
        SampleFormat::Int => {
            let full_scale = (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_error)?
        }
    };

    let channels = usize::from(spec.channels);
    let mono: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    if mono.is_empty() {
        return Err(Error::Decode("file contains no audio frames".into()));
    }

    Ok(DecodedAudio::new(mono, spec.sample_rate as f32))
}

/// Mono 32-bit float WAV writer for captured output.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    frames: u64,
}

impl WavSink {
    pub fn create(path: impl AsRef<Path>, sample_rate: f32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let spec = WavSpec {
            channels: 1,
            sample_rate: sample_rate.round() as u32,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(&path, spec)?;

        Ok(Self {
            writer,
            path,
            frames: 0,
        })
    }

    pub fn write(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            self.writer.write_sample(sample)?;
        }
        self.frames += samples.len() as u64;
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Patch the header and close the file.
    pub fn finalize(self) -> Result<PathBuf> {
        self.writer.finalize()?;
        Ok(self.path)
    }
}
