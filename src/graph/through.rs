use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first (source)
into the second (effect). The whole effects chain is a run of these:

  entry → filter → waveshaper → delay → analyser → gain

How It Works:
-------------
1. Render the source into the output buffer
2. Pass that buffer through the effect (in-place processing)

  Source renders:  [0.5, 0.8, -0.3, 0.9, ...]
  Effect processes in-place (e.g., waveshaper)
  Final output:    [0.6, 0.9, -0.4, 0.9, ...]  (shaped result)

Common Use Cases:
-----------------

1. The effects chain itself:

     let chain = entry
         .through(waveshaper)
         .through(delay)
         .through(analyser)
         .through(volume);

2. Scaling a modulation source before it reaches a parameter:

     let wobble = LfoNode::sine(rate).through(GainNode::new(depth));

   - LFO in [-1, 1] → depth gain → ±Hz of cutoff swing

Signal Flow Diagram:
--------------------
  Through: [Source] ──→ [Effect] ──→ output
*/

pub struct Through<S, F> {
    source: S,
    effect: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, effect: F) -> Self {
        Self { source, effect }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.effect.render_block(out, ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::{
        extensions::NodeExt,
        gain::{GainNode, GainParams},
        lfo::{LfoNode, OscillatorParams},
    };

    #[test]
    fn renders_source_then_effect() {
        let mut node = LfoNode::sine(Arc::new(OscillatorParams::new(100.0)))
            .through(GainNode::new(Arc::new(GainParams::new(2000.0))));
        let mut buffer = vec![0.0; 480];
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0));

        let peak = buffer.iter().fold(0.0_f32, |a, &b| a.max(b.abs()));
        assert!(peak > 1.0 && peak <= 2000.0);
    }
}
