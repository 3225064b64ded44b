//! The single source of truth for the parameter vector.
//!
//! Every change is clamped into the vector and then pushed straight into the
//! live stages through an explicit table of apply functions, one per field.
//! The stages pick new values up at their next render quantum.

use tracing::{debug, warn};

use crate::{
    graph::signal_graph::StageHandles,
    params::{Param, ParameterVector},
    preset::Preset,
    Result,
};

/// Hz of cutoff swing per unit of `wobbleDepth`.
pub const WOBBLE_DEPTH_HZ: f32 = 2000.0;

type Apply = fn(&StageHandles, f32);

/// Field → stage dispatch. `speed` has no stage; it belongs to the transport.
const DISPATCH: [(Param, Option<Apply>); 9] = [
    (Param::Volume, Some(|s, v| s.volume.gain.set(v))),
    (Param::Speed, None),
    (Param::FilterCutoff, Some(|s, v| s.filter.cutoff.set(v))),
    (Param::FilterQ, Some(|s, v| s.filter.resonance.set(v))),
    (Param::Distortion, Some(apply_distortion)),
    (Param::DelayTime, Some(|s, v| s.delay.time.set(v))),
    (Param::DelayFeedback, Some(|s, v| s.feedback.gain.set(v))),
    (
        Param::WobbleDepth,
        Some(|s, v| s.oscillator_gain.gain.set(v * WOBBLE_DEPTH_HZ)),
    ),
    (Param::WobbleRate, Some(|s, v| s.oscillator.frequency.set(v))),
];

fn apply_distortion(stages: &StageHandles, amount: f32) {
    // Only rebuilds the table when the amount actually moved
    if stages.waveshaper.set_amount(amount) {
        debug!(amount, "distortion curve regenerated");
    }
}

fn apply_fn(param: Param) -> Option<Apply> {
    DISPATCH
        .iter()
        .find(|(p, _)| *p == param)
        .and_then(|(_, apply)| *apply)
}

#[derive(Default)]
pub struct ParameterController {
    vector: ParameterVector,
    stages: Option<StageHandles>,
}

impl ParameterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector(&self) -> &ParameterVector {
        &self.vector
    }

    pub fn get(&self, param: Param) -> f32 {
        self.vector.get(param)
    }

    pub fn get_by_name(&self, name: &str) -> Result<f32> {
        Ok(self.get(name.parse()?))
    }

    pub fn is_bound(&self) -> bool {
        self.stages.is_some()
    }

    /// Attach to a freshly built graph and bring every stage in line with
    /// the vector.
    pub fn bind(&mut self, stages: StageHandles) {
        for (param, value) in self.vector.iter() {
            if let Some(apply) = apply_fn(param) {
                apply(&stages, value);
            }
        }
        self.stages = Some(stages);
        debug!("parameter vector pushed into stages");
    }

    /// Clamp `value` into `param`'s range, store it and push it to the
    /// stage. Returns the value now in effect.
    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        if value.is_nan() {
            warn!(%param, "ignoring NaN parameter value");
            return self.get(param);
        }
        let stored = self.vector.set(param, value);
        if let (Some(stages), Some(apply)) = (&self.stages, apply_fn(param)) {
            apply(stages, stored);
        }
        debug!(%param, requested = value, applied = stored, "parameter set");
        stored
    }

    /// `set` by field id; unknown ids fail with `InvalidParameter`.
    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<f32> {
        let param: Param = name.parse()?;
        Ok(self.set(param, value))
    }

    /// Apply every field of the named preset in one batch.
    pub fn apply_preset(&mut self, name: &str) -> Result<&'static Preset> {
        let preset = Preset::lookup(name)?;
        for (param, value) in preset.fields() {
            self.set(param, value);
        }
        debug!(preset = preset.name, "preset applied");
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EngineConfig, graph::signal_graph::SignalGraph, Error};

    fn bound() -> (ParameterController, StageHandles) {
        let mut graph = SignalGraph::new(EngineConfig {
            curve_len: 256,
            ..EngineConfig::default()
        });
        graph.build();
        let handles = graph.handles().unwrap().clone();
        let mut controller = ParameterController::new();
        controller.bind(handles.clone());
        (controller, handles)
    }

    #[test]
    fn dispatch_covers_every_param() {
        for (i, param) in Param::ALL.iter().enumerate() {
            assert_eq!(DISPATCH[i].0, *param);
        }
    }

    #[test]
    fn bind_pushes_the_whole_vector() {
        let (_, stages) = bound();
        assert_eq!(stages.volume.gain.get(), 0.9);
        assert_eq!(stages.filter.cutoff.get(), 120.0);
        assert_eq!(stages.filter.resonance.get(), 10.0);
        assert_eq!(stages.delay.time.get(), 0.22);
        assert_eq!(stages.feedback.gain.get(), 0.35);
        assert_eq!(stages.oscillator_gain.gain.get(), 1000.0);
        assert_eq!(stages.oscillator.frequency.get(), 2.0);
    }

    #[test]
    fn set_reaches_the_stage() {
        let (mut controller, stages) = bound();
        controller.set(Param::FilterCutoff, 2200.0);
        controller.set(Param::WobbleDepth, 1.2);
        controller.set(Param::Distortion, 40.0);

        assert_eq!(stages.filter.cutoff.get(), 2200.0);
        assert_eq!(stages.oscillator_gain.gain.get(), 2400.0);
        assert_eq!(stages.waveshaper.amount(), 40.0);
    }

    #[test]
    fn clamped_value_is_what_the_stage_sees() {
        let (mut controller, stages) = bound();
        assert_eq!(controller.set(Param::DelayFeedback, 3.0), 0.95);
        assert_eq!(stages.feedback.gain.get(), 0.95);
    }

    #[test]
    fn unbound_controller_still_tracks_vector() {
        let mut controller = ParameterController::new();
        controller.set(Param::Volume, 0.3);
        assert_eq!(controller.get(Param::Volume), 0.3);
        assert!(!controller.is_bound());
    }

    #[test]
    fn unknown_name_is_invalid_parameter() {
        let mut controller = ParameterController::new();
        assert!(matches!(
            controller.set_by_name("reverb", 1.0),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(controller.vector(), &ParameterVector::default());
    }

    #[test]
    fn preset_leaves_volume_alone() {
        let mut controller = ParameterController::new();
        controller.set(Param::Volume, 0.4);
        controller.apply_preset("house").unwrap();

        assert_eq!(controller.get(Param::Volume), 0.4);
        assert_eq!(controller.get(Param::Speed), 1.12);
        assert_eq!(controller.get(Param::WobbleRate), 3.5);
    }
}
