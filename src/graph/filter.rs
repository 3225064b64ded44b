use std::sync::Arc;

use crate::{
    dsp::filter::{resonance_db_to_q, SVFilter},
    graph::{
        node::{GraphNode, Modulatable, RenderCtx},
        param::ParamCell,
    },
};

/*
Lowpass Filter Stage
====================

The first stage after the entry point, and the one the wobble acts on. A
resonant lowpass passes everything below the cutoff and attenuates what is
above it at 12 dB/octave. With the resonance up, a peak forms right at the
cutoff; sweeping that peak up and down through a bass line is the "wub".

Parameters:
-----------

Cutoff (Hz): set by the controller from `filterCutoff` (60 - 10000 Hz).
  The wobble modulation is added on top every render quantum and the sum is
  clamped to 20 - 20000 Hz, so a deep wobble spends part of each cycle
  pinned at 20 Hz (filter closed).

Resonance: set from `filterQ` (0.1 - 24), read as dB of peak gain at the
  cutoff and converted to a linear Q for the SVF.

  // Building the stage with its own parameter cells
  let params = Arc::new(FilterParams::new(120.0, 10.0));
  let filter = FilterNode::new(Arc::clone(&params));
  params.cutoff.set(250.0); // picked up at the next quantum
*/

#[derive(Clone, Copy, Debug)]
pub enum FilterParam {
    Cutoff,
    Resonance,
}

/// Live settings of the filter stage.
#[derive(Debug)]
pub struct FilterParams {
    /// Base cutoff in Hz, before modulation.
    pub cutoff: ParamCell,
    /// Resonance in dB.
    pub resonance: ParamCell,
}

impl FilterParams {
    pub fn new(cutoff_hz: f32, resonance_db: f32) -> Self {
        Self {
            cutoff: ParamCell::new(cutoff_hz),
            resonance: ParamCell::new(resonance_db),
        }
    }
}

pub struct FilterNode {
    filter: SVFilter,
    params: Arc<FilterParams>,
    /// Resonance the SVF's Q was last derived from
    applied_resonance: f32,
}

impl FilterNode {
    pub fn new(params: Arc<FilterParams>) -> Self {
        let mut filter = SVFilter::lowpass(params.cutoff.get());
        let applied_resonance = params.resonance.get();
        filter.set_q(resonance_db_to_q(applied_resonance));

        Self {
            filter,
            params,
            applied_resonance,
        }
    }

    /// Cutoff the filter is actually running at, modulation included.
    pub fn effective_cutoff(&self) -> f32 {
        self.filter.cutoff_hz
    }

    fn sync_resonance(&mut self) {
        let resonance = self.params.resonance.get();
        if resonance != self.applied_resonance {
            self.applied_resonance = resonance;
            self.filter.set_q(resonance_db_to_q(resonance));
        }
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.params.cutoff.get(),
            FilterParam::Resonance => self.params.resonance.get(),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        let final_value = base + modulation;
        match param {
            FilterParam::Cutoff => {
                // SVFilter clamps to 20 - 20000 Hz
                self.filter.set_cutoff(final_value);
            }
            FilterParam::Resonance => {
                self.applied_resonance = final_value;
                self.filter.set_q(resonance_db_to_q(final_value));
            }
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.sync_resonance();
        self.filter.render(out, ctx);
    }
}
