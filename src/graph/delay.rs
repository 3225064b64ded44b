use std::sync::Arc;

use crate::{
    dsp::delay::DelayLine,
    graph::{
        gain::GainParams,
        node::{GraphNode, RenderCtx},
        param::ParamCell,
    },
};

/*
Feedback Delay Stage
====================

    input ──→ (+) ──→ [delay line] ──┬──→ output
               ↑                     │
               └── [feedback gain] ←─┘

The stage emits only the delayed (wet) signal. Everything written into the
line comes back out `delayTime` seconds later, and a `delayFeedback`
fraction of it is written back in, giving a train of decaying echoes.

The feedback gain is its own stage in the topology, but it has to run per
sample inside the loop, so the node reads the feedback stage's cell
directly. The loop always contains at least one sample of delay-line
latency (`DelayLine` never reads fewer than one sample back), even with
`delayTime` at 0, and the gain is clamped below unity here no matter what
the cell holds.
*/

/// Hard ceiling on loop gain.
pub const MAX_FEEDBACK: f32 = 0.95;

#[derive(Debug)]
pub struct DelayParams {
    /// Delay time in seconds.
    pub time: ParamCell,
}

impl DelayParams {
    pub fn new(time_seconds: f32) -> Self {
        Self {
            time: ParamCell::new(time_seconds),
        }
    }
}

pub struct DelayNode {
    line: DelayLine,
    params: Arc<DelayParams>,
    feedback: Arc<GainParams>,
}

impl DelayNode {
    /// `max_delay_samples` sizes the line; longer delay times are clamped.
    pub fn new(
        max_delay_samples: usize,
        params: Arc<DelayParams>,
        feedback: Arc<GainParams>,
    ) -> Self {
        Self {
            // Interpolation reads one sample past the delay
            line: DelayLine::new(max_delay_samples + 2),
            params,
            feedback,
        }
    }
}

impl GraphNode for DelayNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let delay_samples = self.params.time.get().max(0.0) * ctx.sample_rate;
        let feedback = self.feedback.gain.get().clamp(0.0, MAX_FEEDBACK);
        self.line.render(out, delay_samples, feedback);
    }
}
