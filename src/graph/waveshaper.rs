use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{
    dsp::distortion::{make_distortion_curve, shape_buffer},
    graph::{
        node::{GraphNode, RenderCtx},
        param::ParamCell,
    },
};

/*
Waveshaper Stage
================

Adds harmonics and grit by mapping every sample through a transfer table.
The table comes from `make_distortion_curve` and depends only on the drive
amount (`distortion`, 0 - 100):

  0      straight line, the stage only scales (slope 1/3)
  5-25   soft knee, warmth on the bass
  60+    heavy compression of the peaks, buzzy odd harmonics

Updating the curve
------------------

The table is tens of thousands of entries and is rebuilt on the control
side whenever the drive changes. The finished table is published with a
single pointer swap. The node picks the current table up once at the top of
every render quantum, so a quantum is shaped entirely by the old table or
entirely by the new one.

  let params = Arc::new(WaveShaperParams::new(0.0, DEFAULT_CURVE_LEN));
  let shaper = WaveShaperNode::new(Arc::clone(&params));
  params.set_amount(60.0); // rebuilds and swaps the table
*/

#[derive(Debug)]
pub struct WaveShaperParams {
    curve: ArcSwap<Vec<f32>>,
    amount: ParamCell,
    curve_len: usize,
}

impl WaveShaperParams {
    pub fn new(amount: f32, curve_len: usize) -> Self {
        Self {
            curve: ArcSwap::from_pointee(make_distortion_curve(amount, curve_len)),
            amount: ParamCell::new(amount),
            curve_len,
        }
    }

    /// Drive amount the current table was built from.
    pub fn amount(&self) -> f32 {
        self.amount.get()
    }

    /// Rebuild the table for `amount` and publish it.
    ///
    /// Returns false without touching the table if `amount` is unchanged.
    pub fn set_amount(&self, amount: f32) -> bool {
        if amount == self.amount.get() {
            return false;
        }
        let curve = make_distortion_curve(amount, self.curve_len);
        self.curve.store(Arc::new(curve));
        self.amount.set(amount);
        true
    }

    /// The table currently in use.
    pub fn curve(&self) -> Arc<Vec<f32>> {
        self.curve.load_full()
    }
}

pub struct WaveShaperNode {
    params: Arc<WaveShaperParams>,
}

impl WaveShaperNode {
    pub fn new(params: Arc<WaveShaperParams>) -> Self {
        Self { params }
    }
}

impl GraphNode for WaveShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        let curve = self.params.curve.load();
        shape_buffer(out, &curve);
    }
}
