use std::sync::Arc;

use crate::{
    dsp::amplify::apply_gain,
    graph::{
        node::{GraphNode, RenderCtx},
        param::ParamCell,
    },
};

/// Live setting of a gain stage.
#[derive(Debug)]
pub struct GainParams {
    pub gain: ParamCell,
}

impl GainParams {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: ParamCell::new(gain),
        }
    }
}

/// Scales its input by a shared gain.
///
/// Serves as the output volume and as the wobble depth stage that turns the
/// LFO's ±1 into ±Hz of cutoff swing. The delay loop's feedback gain lives
/// inside `DelayNode` because it has to run per sample.
pub struct GainNode {
    params: Arc<GainParams>,
}

impl GainNode {
    pub fn new(params: Arc<GainParams>) -> Self {
        Self { params }
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        apply_gain(out, self.params.gain.get());
    }
}
