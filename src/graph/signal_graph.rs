use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    graph::{
        analyser::{AnalyserNode, TapPoint},
        delay::{DelayNode, DelayParams},
        entry::{EntryNode, EntryPort},
        extensions::NodeExt,
        filter::{FilterNode, FilterParam, FilterParams},
        gain::{GainNode, GainParams},
        lfo::{LfoNode, OscillatorParams},
        node::{GraphNode, RenderCtx},
        topology::{self, StageKind, TOPOLOGY},
        waveshaper::{WaveShaperNode, WaveShaperParams},
    },
    transport::FrameClock,
    MAX_BLOCK_SIZE,
};

/*
Signal Graph
============

Owns the stages of one session and their fixed wiring:

  entry → filter → waveshaper → delay → analyser → gain → output
                                  ↑  ↓       └──→ tap
                           feedback-gain
  oscillator → oscillator-gain ┄┄→ filter.cutoff

The graph is split in two halves when it is built:

- the control half stays here: the parameter cells of every stage
  (`StageHandles`), the entry port that playback units attach to, and the
  tap point;
- the audio half is the `GraphProcessor`, which the host moves into its
  audio callback. It owns the nodes and advances the audio clock.

The two halves share nothing but atomics, so the control side never waits
on the audio thread.
*/

/// Serial stage order `build` wires between the entry node and the output.
const WIRED_ORDER: [StageKind; 5] = [
    StageKind::Filter,
    StageKind::WaveShaper,
    StageKind::Delay,
    StageKind::Analyser,
    StageKind::Gain,
];

/// Control-side handles to every stage's live parameters.
#[derive(Clone)]
pub struct StageHandles {
    pub filter: Arc<FilterParams>,
    pub waveshaper: Arc<WaveShaperParams>,
    pub delay: Arc<DelayParams>,
    pub feedback: Arc<GainParams>,
    pub volume: Arc<GainParams>,
    pub oscillator: Arc<OscillatorParams>,
    pub oscillator_gain: Arc<GainParams>,
}

impl StageHandles {
    /// Neutral settings; the controller pushes the real ones on bind.
    fn new(config: &EngineConfig) -> Self {
        Self {
            filter: Arc::new(FilterParams::new(20_000.0, 0.0)),
            waveshaper: Arc::new(WaveShaperParams::new(0.0, config.curve_len)),
            delay: Arc::new(DelayParams::new(0.0)),
            feedback: Arc::new(GainParams::new(0.0)),
            volume: Arc::new(GainParams::new(1.0)),
            oscillator: Arc::new(OscillatorParams::new(0.0)),
            oscillator_gain: Arc::new(GainParams::new(0.0)),
        }
    }
}

struct BuiltGraph {
    handles: StageHandles,
    entry: EntryPort,
    tap: TapPoint,
    processor: Option<GraphProcessor>,
}

pub struct SignalGraph {
    config: EngineConfig,
    clock: Arc<FrameClock>,
    built: Option<BuiltGraph>,
}

impl SignalGraph {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.validate();
        let clock = Arc::new(FrameClock::new(config.sample_rate));
        Self {
            config,
            clock,
            built: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The clock the processor advances.
    pub fn clock(&self) -> Arc<FrameClock> {
        Arc::clone(&self.clock)
    }

    /// Instantiate and wire every stage, and start the wobble oscillator.
    ///
    /// Does nothing if the graph is already built. Returns true if this call
    /// built it.
    pub fn build(&mut self) -> bool {
        if self.built.is_some() {
            debug!("signal graph already built");
            return false;
        }
        debug_assert_eq!(topology::validate(TOPOLOGY), Ok(()));
        debug_assert_eq!(topology::signal_path(TOPOLOGY), WIRED_ORDER);

        let handles = StageHandles::new(&self.config);
        let (entry_node, entry) = EntryNode::new();
        let (analyser, tap) = AnalyserNode::new(&self.config);

        let wobble = LfoNode::sine(Arc::clone(&handles.oscillator))
            .through(GainNode::new(Arc::clone(&handles.oscillator_gain)));
        let chain = entry_node
            .through(FilterNode::new(Arc::clone(&handles.filter)).modulate(
                wobble,
                FilterParam::Cutoff,
                1.0,
            ))
            .through(WaveShaperNode::new(Arc::clone(&handles.waveshaper)))
            .through(DelayNode::new(
                self.config.max_delay_samples(),
                Arc::clone(&handles.delay),
                Arc::clone(&handles.feedback),
            ))
            .through(analyser)
            .through(GainNode::new(Arc::clone(&handles.volume)));

        let processor = GraphProcessor {
            chain: Box::new(chain),
            clock: Arc::clone(&self.clock),
            sample_rate: self.config.sample_rate,
            quantum: self.config.render_quantum,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        };

        self.built = Some(BuiltGraph {
            handles,
            entry,
            tap,
            processor: Some(processor),
        });
        info!(
            sample_rate = self.config.sample_rate,
            quantum = self.config.render_quantum,
            "signal graph built, wobble oscillator started"
        );
        true
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// The oscillator starts with the graph and never stops.
    pub fn oscillator_started(&self) -> bool {
        self.is_built()
    }

    /// The stage new playback units feed.
    pub fn entry_stage(&self) -> StageKind {
        topology::entry_stage(TOPOLOGY).unwrap_or(StageKind::Filter)
    }

    /// The stage the visualizer and recorder read from.
    pub fn tap_stage(&self) -> StageKind {
        topology::tap_stage(TOPOLOGY).unwrap_or(StageKind::Analyser)
    }

    pub fn entry_port(&self) -> Option<EntryPort> {
        self.built.as_ref().map(|g| g.entry.clone())
    }

    pub fn tap(&self) -> Option<&TapPoint> {
        self.built.as_ref().map(|g| &g.tap)
    }

    pub fn tap_mut(&mut self) -> Option<&mut TapPoint> {
        self.built.as_mut().map(|g| &mut g.tap)
    }

    pub fn handles(&self) -> Option<&StageHandles> {
        self.built.as_ref().map(|g| &g.handles)
    }

    /// Hand the audio half to the host. Available once per build.
    pub fn take_processor(&mut self) -> Option<GraphProcessor> {
        self.built.as_mut().and_then(|g| g.processor.take())
    }
}

/// The audio half of a built graph.
pub struct GraphProcessor {
    chain: Box<dyn GraphNode>,
    clock: Arc<FrameClock>,
    sample_rate: f32,
    quantum: usize,
    scratch: Vec<f32>,
}

impl GraphProcessor {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Render mono output, one render quantum at a time.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(self.quantum) {
            let ctx = RenderCtx::new(self.sample_rate);
            self.chain.render_block(block, &ctx);
            self.clock.advance(block.len() as u64);
        }
    }

    /// Render into an interleaved device buffer, copying mono to every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let mut block = std::mem::take(&mut self.scratch);
            self.render(&mut block[..frames_to_render]);

            let out_off = frames_written * channels;
            for (i, &s) in block[..frames_to_render].iter().enumerate() {
                for ch in 0..channels {
                    data[out_off + i * channels + ch] = s;
                }
            }
            self.scratch = block;

            frames_written += frames_to_render;
        }
    }
}
