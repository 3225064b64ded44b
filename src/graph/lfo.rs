use std::sync::Arc;

use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::{
        node::{GraphNode, RenderCtx},
        param::ParamCell,
    },
};

/*
Wobble LFO
==========

A sine oscillator running at sub-audio rate (0.1 - 10 Hz, `wobbleRate`).
It never reaches the output; its ±1 signal is scaled by the wobble depth
stage and added to the filter cutoff.

The LFO is free-running: it starts when the graph is built and keeps its
phase across play/pause and file swaps. Restarting playback does not
restart the wobble cycle.

    0.5 Hz   slow, half-time wobble
    2 Hz     the default; eighth notes around 120 BPM
    3.5 Hz   fast house-style pumping
*/

#[derive(Debug)]
pub struct OscillatorParams {
    pub frequency: ParamCell,
}

impl OscillatorParams {
    pub fn new(frequency_hz: f32) -> Self {
        Self {
            frequency: ParamCell::new(frequency_hz),
        }
    }
}

pub struct LfoNode {
    osc: OscillatorBlock,
    params: Arc<OscillatorParams>,
}

impl LfoNode {
    pub fn sine(params: Arc<OscillatorParams>) -> Self {
        Self {
            osc: OscillatorBlock::new(),
            params,
        }
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let frequency = self.params.frequency.get();
        self.osc.render(out, frequency, ctx.sample_rate);
    }
}
