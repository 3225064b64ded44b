//! Named starting points for the effect chain.
//!
//! A preset sets every control except volume, which stays where the
//! listener put it.

use crate::{params::Param, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub speed: f32,
    pub filter_cutoff: f32,
    pub filter_q: f32,
    pub distortion: f32,
    pub delay_time: f32,
    pub delay_feedback: f32,
    pub wobble_depth: f32,
    pub wobble_rate: f32,
}

const PRESETS: [Preset; 4] = [
    Preset {
        name: "wub",
        speed: 0.95,
        filter_cutoff: 250.0,
        filter_q: 12.0,
        distortion: 25.0,
        delay_time: 0.28,
        delay_feedback: 0.42,
        wobble_depth: 0.9,
        wobble_rate: 2.0,
    },
    Preset {
        name: "dubstep",
        speed: 0.9,
        filter_cutoff: 180.0,
        filter_q: 18.0,
        distortion: 60.0,
        delay_time: 0.32,
        delay_feedback: 0.55,
        wobble_depth: 1.0,
        wobble_rate: 1.2,
    },
    Preset {
        name: "chill",
        speed: 0.85,
        filter_cutoff: 1200.0,
        filter_q: 4.0,
        distortion: 5.0,
        delay_time: 0.24,
        delay_feedback: 0.25,
        wobble_depth: 0.25,
        wobble_rate: 0.7,
    },
    Preset {
        name: "house",
        speed: 1.12,
        filter_cutoff: 2200.0,
        filter_q: 6.0,
        distortion: 12.0,
        delay_time: 0.18,
        delay_feedback: 0.2,
        wobble_depth: 0.35,
        wobble_rate: 3.5,
    },
];

impl Preset {
    /// Every preset, in table order.
    pub fn all() -> &'static [Preset] {
        &PRESETS
    }

    pub fn lookup(name: &str) -> Result<&'static Preset> {
        PRESETS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPreset(name.to_string()))
    }

    /// The fields this preset sets, in application order.
    pub fn fields(&self) -> [(Param, f32); 8] {
        [
            (Param::Speed, self.speed),
            (Param::FilterCutoff, self.filter_cutoff),
            (Param::FilterQ, self.filter_q),
            (Param::Distortion, self.distortion),
            (Param::DelayTime, self.delay_time),
            (Param::DelayFeedback, self.delay_feedback),
            (Param::WobbleDepth, self.wobble_depth),
            (Param::WobbleRate, self.wobble_rate),
        ]
    }
}
