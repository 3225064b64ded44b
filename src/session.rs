//! One loaded file, one graph, one parameter vector.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tracing::{debug, info};

use crate::{
    capture::{capture_file_name, unix_millis, CaptureSummary, Recorder},
    config::EngineConfig,
    controller::ParameterController,
    graph::{
        analyser::TapPoint,
        signal_graph::{GraphProcessor, SignalGraph},
        topology::StageKind,
    },
    io::{DecodedAudio, Decoder},
    params::{Param, ParameterVector},
    preset::Preset,
    transport::{AudioClock, Transport, TransportState},
    Error, Result,
};

/*
Session
=======

Binds together everything one open file needs:

  SignalGraph           built on the first successful load, never rebuilt
  ParameterController   survives file swaps; effects persist
  Transport             reset by every load
  Recorder              optional, independent of the transport

Loading is split in three so decodes can overlap:

  let ticket = session.request_load("song.wav");   // sync, newest wins
  let decoded = decoder.decode(bytes).await;        // async, cancellable
  session.commit_load(ticket, decoded)?;            // sync, stale → Ok(false)

A ticket is only honoured if no newer `request_load` happened since it was
issued, so a slow decode that finishes after a newer one never replaces it.
*/

/// Issues load tickets and remembers which one is newest.
#[derive(Debug, Default)]
pub struct LoadGate {
    latest: AtomicU64,
}

impl LoadGate {
    pub fn issue(&self, source: impl Into<String>) -> LoadTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        LoadTicket {
            generation,
            source: source.into(),
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.generation
    }
}

/// One requested load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    source: String,
}

impl LoadTicket {
    pub fn source(&self) -> &str {
        &self.source
    }
}

pub struct Session {
    config: EngineConfig,
    graph: SignalGraph,
    controller: ParameterController,
    transport: Transport,
    loads: LoadGate,
    source: Option<String>,
    recorder: Option<Recorder>,
}

impl Session {
    /// A session whose transport follows the graph's own frame clock.
    pub fn new(config: EngineConfig) -> Self {
        let graph = SignalGraph::new(config);
        let clock: Arc<dyn AudioClock> = graph.clock();
        Self::assemble(graph, clock)
    }

    /// A session whose transport reads time from `clock`.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn AudioClock>) -> Self {
        Self::assemble(SignalGraph::new(config), clock)
    }

    fn assemble(graph: SignalGraph, clock: Arc<dyn AudioClock>) -> Self {
        Self {
            config: graph.config().clone(),
            graph,
            controller: ParameterController::new(),
            transport: Transport::new(clock),
            loads: LoadGate::default(),
            source: None,
            recorder: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the loaded file, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    // ---- loading ----------------------------------------------------------

    /// Register a new load. Any ticket issued before this one goes stale.
    pub fn request_load(&self, source: impl Into<String>) -> LoadTicket {
        let ticket = self.loads.issue(source);
        debug!(generation = ticket.generation, source = %ticket.source, "load requested");
        ticket
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.loads.is_current(ticket)
    }

    /// Apply a finished decode if its ticket is still the newest.
    ///
    /// Returns `Ok(false)` for a stale ticket, whatever the decode produced.
    /// A failed decode for the current ticket is returned as-is and leaves
    /// the session untouched.
    pub fn commit_load(
        &mut self,
        ticket: LoadTicket,
        decoded: Result<DecodedAudio>,
    ) -> Result<bool> {
        if !self.loads.is_current(&ticket) {
            debug!(
                generation = ticket.generation,
                source = %ticket.source,
                "discarding stale decode"
            );
            return Ok(false);
        }
        let decoded = decoded?;

        if self.graph.build() {
            if let Some(handles) = self.graph.handles() {
                self.controller.bind(handles.clone());
            }
            if let Some(entry) = self.graph.entry_port() {
                self.transport.connect(entry);
            }
        }

        let duration = decoded.duration_seconds;
        let sample_rate = decoded.sample_rate;
        self.transport.load(Arc::new(decoded.into_buffer()), duration);
        info!(source = %ticket.source, duration, sample_rate, "file loaded");
        self.source = Some(ticket.source);
        Ok(true)
    }

    /// Request, decode and commit in one go.
    pub async fn load<D: Decoder>(
        &mut self,
        decoder: &D,
        source: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<bool> {
        let ticket = self.request_load(source);
        let decoded = decoder.decode(bytes).await;
        self.commit_load(ticket, decoded)
    }

    /// Load an already decoded buffer.
    pub fn load_decoded(&mut self, source: impl Into<String>, decoded: DecodedAudio) -> Result<bool> {
        let ticket = self.request_load(source);
        self.commit_load(ticket, Ok(decoded))
    }

    // ---- graph ------------------------------------------------------------

    pub fn is_built(&self) -> bool {
        self.graph.is_built()
    }

    pub fn entry_stage(&self) -> StageKind {
        self.graph.entry_stage()
    }

    pub fn tap_stage(&self) -> StageKind {
        self.graph.tap_stage()
    }

    /// The audio half of the graph, for the host's audio callback.
    /// Available once, after the first load.
    pub fn take_processor(&mut self) -> Option<GraphProcessor> {
        self.graph.take_processor()
    }

    /// Spectrum reads for the visualizer. `None` until the graph is built.
    pub fn tap(&mut self) -> Option<&mut TapPoint> {
        self.graph.tap_mut()
    }

    // ---- transport --------------------------------------------------------

    pub fn state(&mut self) -> TransportState {
        self.transport.state()
    }

    pub fn play(&mut self) -> bool {
        let speed = self.controller.get(Param::Speed);
        self.transport.play(speed)
    }

    pub fn pause(&mut self) {
        self.transport.pause();
    }

    pub fn stop(&mut self) {
        self.transport.stop();
    }

    pub fn elapsed(&mut self) -> f64 {
        self.transport.elapsed()
    }

    pub fn duration(&self) -> f64 {
        self.transport.duration()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // ---- parameters -------------------------------------------------------

    pub fn get(&self, param: Param) -> f32 {
        self.controller.get(param)
    }

    pub fn get_by_name(&self, name: &str) -> Result<f32> {
        self.controller.get_by_name(name)
    }

    pub fn parameters(&self) -> &ParameterVector {
        self.controller.vector()
    }

    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        let applied = self.controller.set(param, value);
        if param == Param::Speed {
            self.transport.set_speed(applied);
        }
        applied
    }

    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<f32> {
        let param: Param = name.parse()?;
        Ok(self.set(param, value))
    }

    pub fn apply_preset(&mut self, name: &str) -> Result<&'static Preset> {
        let preset = self.controller.apply_preset(name)?;
        self.transport.set_speed(self.controller.get(Param::Speed));
        Ok(preset)
    }

    // ---- capture ----------------------------------------------------------

    pub fn is_capturing(&self) -> bool {
        self.recorder.is_some()
    }

    /// Start recording the tap stream into a new file under `dir`.
    pub fn start_capture(&mut self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        if self.recorder.is_some() {
            return Err(Error::CaptureStart("capture already active".into()));
        }
        let sample_rate = self.config.sample_rate;
        let name = capture_file_name(self.source.as_deref(), unix_millis());
        let path = dir.as_ref().join(name);

        let tap = self
            .graph
            .tap_mut()
            .ok_or_else(|| Error::CaptureStart("no tap stream before the first load".into()))?;
        let stream = tap.open_stream()?;

        match Recorder::start(stream, path.clone(), sample_rate) {
            Ok(recorder) => {
                self.recorder = Some(recorder);
                Ok(path)
            }
            Err((e, stream)) => {
                tap.close_stream(stream);
                Err(e)
            }
        }
    }

    /// Stop recording and finalize the file.
    pub fn stop_capture(&mut self) -> Result<CaptureSummary> {
        let recorder = self.recorder.take().ok_or(Error::CaptureStop)?;
        let (result, stream) = recorder.finish();
        if let (Some(stream), Some(tap)) = (stream, self.graph.tap_mut()) {
            tap.close_stream(stream);
        }
        result
    }
}
