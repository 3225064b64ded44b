use crate::{
    dsp::modulate::{apply_modulation, block_average},
    graph::node::{GraphNode, Modulatable, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Modulate Node
=============

Connects a modulation source to a parameter on another node. In the effects
chain this is the wobble: the LFO (through its depth gain) moves the
filter's cutoff.

  let wobble = LfoNode::sine(rate).through(GainNode::new(depth_hz));
  let filter = FilterNode::new(params)
      .modulate(wobble, FilterParam::Cutoff, 1.0);


Understanding Depth
-------------------

    modulated_value = base_value + (source × depth)

The wobble depth is already applied by the gain stage in front of the
modulator (wobbleDepth × 2000 Hz), so the chain connects it with a depth
of 1.0 and the source's output is the swing in Hz.

Example with cutoff=120, wobbleDepth=0.5 (1000 Hz), LFO swinging -1 to +1:
    LFO = -1.0  →  cutoff = 120 - 1000 = -880 → clamped to 20 Hz
    LFO =  0.0  →  cutoff = 120 Hz
    LFO = +1.0  →  cutoff = 120 + 1000 = 1120 Hz


How It Works
------------

See `dsp/modulate.rs` for the block-rate averaging and why the cutoff is
updated once per render quantum.
*/

pub struct Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    source: S,            // The node being modulated
    lfo: L,               // The modulation source
    param: S::Param,      // Which parameter to modulate
    depth: f32,           // Scales the source's output
    lfo_buffer: Vec<f32>, // Temp buffer for the source's output
}

impl<S, L> Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    pub fn new(source: S, lfo: L, param: S::Param, depth: f32) -> Self {
        Self {
            source,
            lfo,
            param,
            depth,
            lfo_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<S, L> GraphNode for Modulate<S, L>
where
    S: GraphNode + Modulatable,
    L: GraphNode,
{
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();

        // Render the modulator to the temp buffer
        self.lfo.render_block(&mut self.lfo_buffer[..len], ctx);

        // Average over the block for block-rate modulation
        let lfo_avg = block_average(&self.lfo_buffer[..len]);

        // Calculate and apply modulation
        let base_value = self.source.get_param(self.param);
        let modulation = apply_modulation(0.0, lfo_avg, self.depth);
        self.source
            .apply_modulation(self.param, base_value, modulation);

        // Render the source with the modulated parameter
        self.source.render_block(out, ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::{
        extensions::NodeExt,
        filter::{FilterNode, FilterParam, FilterParams},
        gain::{GainNode, GainParams},
        lfo::{LfoNode, OscillatorParams},
    };

    fn wobble(rate: f32, depth_hz: f32) -> impl GraphNode {
        LfoNode::sine(Arc::new(OscillatorParams::new(rate)))
            .through(GainNode::new(Arc::new(GainParams::new(depth_hz))))
    }

    #[test]
    fn test_base_value_is_not_overwritten() {
        let params = Arc::new(FilterParams::new(120.0, 10.0));
        let mut filter = FilterNode::new(Arc::clone(&params)).modulate(
            wobble(2.0, 1000.0),
            FilterParam::Cutoff,
            1.0,
        );

        let mut buffer = vec![0.0; 128];
        let ctx = RenderCtx::new(48_000.0);
        for _ in 0..100 {
            filter.render_block(&mut buffer, &ctx);
        }

        assert_eq!(params.cutoff.get(), 120.0);
    }

    #[test]
    fn test_extreme_depth_stays_finite() {
        let params = Arc::new(FilterParams::new(1000.0, 24.0));
        let mut filter =
            FilterNode::new(params).modulate(wobble(10.0, 2000.0), FilterParam::Cutoff, 100.0);

        let mut osc = crate::dsp::oscillator::OscillatorBlock::new();
        let ctx = RenderCtx::new(48_000.0);
        let mut buffer = vec![0.0; 128];
        for _ in 0..200 {
            osc.render(&mut buffer, 110.0, 48_000.0);
            filter.render_block(&mut buffer, &ctx);
            for &sample in &buffer {
                assert!(sample.is_finite(), "non-finite output: {}", sample);
            }
        }
    }

    #[test]
    fn test_zero_depth_leaves_cutoff_at_base() {
        let params = Arc::new(FilterParams::new(440.0, 1.0));
        let mut filter =
            FilterNode::new(params).modulate(wobble(2.0, 0.0), FilterParam::Cutoff, 1.0);

        let mut buffer = vec![0.0; 128];
        filter.render_block(&mut buffer, &RenderCtx::new(48_000.0));

        assert_eq!(filter.source.effective_cutoff(), 440.0);
    }
}
