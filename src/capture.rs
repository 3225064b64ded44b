//! Recording the tap stream to disk.
//!
//! A `Recorder` owns the checked-out `TapStream` and drains it on its own
//! thread into a WAV file until told to stop. It neither knows nor cares
//! whether anything is playing; silence is recorded as silence.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tracing::{info, warn};

use crate::{graph::analyser::TapStream, io::WavSink, Error, Result};

const DRAIN_INTERVAL: Duration = Duration::from_millis(10);

/// `<source stem>-wub-<unix millis>.wav`
pub fn capture_file_name(source: Option<&str>, unix_millis: u128) -> String {
    let stem = source
        .and_then(|s| Path::new(s).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("capture");
    format!("{}-wub-{}.wav", stem, unix_millis)
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// What a finished capture produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSummary {
    pub path: PathBuf,
    pub frames: u64,
    /// Samples lost because the recorder fell behind
    pub dropped: u64,
}

pub struct Recorder {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<(Result<CaptureSummary>, TapStream)>,
    path: PathBuf,
}

impl Recorder {
    /// Create the capture file and start draining `stream` into it.
    ///
    /// If the file cannot be created the stream is handed back with the
    /// error so the tap can take it back.
    pub fn start(
        stream: TapStream,
        path: PathBuf,
        sample_rate: f32,
    ) -> std::result::Result<Self, (Error, TapStream)> {
        let sink = match WavSink::create(&path, sample_rate) {
            Ok(sink) => sink,
            Err(e) => return Err((Error::CaptureStart(e.to_string()), stream)),
        };
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || record(stream, sink, stop))
        };
        info!(path = %path.display(), "capture started");

        Ok(Self { stop, handle, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop draining, finalize the file and return the stream.
    ///
    /// The stream is lost only if the recorder thread panicked.
    pub fn finish(self) -> (Result<CaptureSummary>, Option<TapStream>) {
        self.stop.store(true, Ordering::Release);
        match self.handle.join() {
            Ok((result, stream)) => {
                if let Ok(summary) = &result {
                    if summary.dropped > 0 {
                        warn!(dropped = summary.dropped, "capture lost samples");
                    }
                    info!(path = %summary.path.display(), frames = summary.frames, "capture finished");
                }
                (result, Some(stream))
            }
            Err(_) => (
                Err(Error::Io(std::io::Error::other("recorder thread panicked"))),
                None,
            ),
        }
    }
}

fn record(
    mut stream: TapStream,
    mut sink: WavSink,
    stop: Arc<AtomicBool>,
) -> (Result<CaptureSummary>, TapStream) {
    let mut pending = Vec::with_capacity(8192);
    let result = (|| -> Result<CaptureSummary> {
        loop {
            let stopping = stop.load(Ordering::Acquire);
            pending.clear();
            stream.drain_into(&mut pending);
            sink.write(&pending)?;
            if stopping {
                break;
            }
            thread::sleep(DRAIN_INTERVAL);
        }
        let frames = sink.frames();
        let dropped = stream.dropped();
        let path = sink.finalize()?;
        Ok(CaptureSummary {
            path,
            frames,
            dropped,
        })
    })();
    (result, stream)
}
