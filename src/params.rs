//! User-facing controls: their names, ranges and the vector that holds them.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// Static metadata for one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Field name as used by `set`/`get` and presets
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Unit label ("" for unitless)
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Nudge increment for hosts
    pub step: f32,
}

impl ParamSpec {
    /// Clamp into `[min, max]`. NaN has no place in the range and yields `None`.
    pub fn clamp(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            None
        } else {
            Some(value.clamp(self.min, self.max))
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Volume,
    Speed,
    FilterCutoff,
    FilterQ,
    Distortion,
    DelayTime,
    DelayFeedback,
    WobbleDepth,
    WobbleRate,
}

const SPECS: [ParamSpec; 9] = [
    ParamSpec {
        id: "volume",
        name: "Volume",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.9,
        step: 0.05,
    },
    ParamSpec {
        id: "speed",
        name: "Speed",
        unit: "x",
        min: 0.5,
        max: 2.0,
        default: 1.0,
        step: 0.05,
    },
    ParamSpec {
        id: "filterCutoff",
        name: "Filter Cutoff",
        unit: "Hz",
        min: 60.0,
        max: 10_000.0,
        default: 120.0,
        step: 10.0,
    },
    ParamSpec {
        id: "filterQ",
        name: "Resonance",
        unit: "",
        min: 0.1,
        max: 24.0,
        default: 10.0,
        step: 0.5,
    },
    ParamSpec {
        id: "distortion",
        name: "Distortion",
        unit: "",
        min: 0.0,
        max: 100.0,
        default: 0.0,
        step: 1.0,
    },
    ParamSpec {
        id: "delayTime",
        name: "Delay Time",
        unit: "s",
        min: 0.0,
        max: 1.0,
        default: 0.22,
        step: 0.01,
    },
    ParamSpec {
        id: "delayFeedback",
        name: "Feedback",
        unit: "",
        min: 0.0,
        max: 0.95,
        default: 0.35,
        step: 0.01,
    },
    ParamSpec {
        id: "wobbleDepth",
        name: "Wobble Depth",
        unit: "",
        min: 0.0,
        max: 1.2,
        default: 0.5,
        step: 0.05,
    },
    ParamSpec {
        id: "wobbleRate",
        name: "Wobble Rate",
        unit: "Hz",
        min: 0.1,
        max: 10.0,
        default: 2.0,
        step: 0.1,
    },
];

impl Param {
    pub const ALL: [Param; 9] = [
        Param::Volume,
        Param::Speed,
        Param::FilterCutoff,
        Param::FilterQ,
        Param::Distortion,
        Param::DelayTime,
        Param::DelayFeedback,
        Param::WobbleDepth,
        Param::WobbleRate,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ParamSpec {
        &SPECS[self.index()]
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Param {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| Error::InvalidParameter(s.to_string()))
    }
}

/// The current value of every control. Always complete, always in range.
///
/// Deserialized values go through `set`, so out-of-range entries are clamped
/// and NaN entries keep their default.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawParameters"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterVector {
    values: [f32; 9],
}

/// Wire form of `ParameterVector` before validation.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawParameters {
    values: [f32; 9],
}

#[cfg(feature = "serde")]
impl From<RawParameters> for ParameterVector {
    fn from(raw: RawParameters) -> Self {
        let mut vector = Self::default();
        for (&param, value) in Param::ALL.iter().zip(raw.values) {
            vector.set(param, value);
        }
        vector
    }
}

impl Default for ParameterVector {
    fn default() -> Self {
        Self {
            values: SPECS.map(|spec| spec.default),
        }
    }
}

impl ParameterVector {
    pub fn get(&self, param: Param) -> f32 {
        self.values[param.index()]
    }

    /// Store `value` clamped to the declared range and return what was stored.
    /// NaN leaves the field as it was.
    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        if let Some(clamped) = param.spec().clamp(value) {
            self.values[param.index()] = clamped;
        }
        self.get(param)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, f32)> + '_ {
        Param::ALL.iter().map(move |&p| (p, self.get(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_line_up_with_params() {
        for (i, param) in Param::ALL.iter().enumerate() {
            assert_eq!(param.index(), i);
            let spec = param.spec();
            assert!(spec.min < spec.max, "{} has an empty range", spec.id);
            assert!((spec.min..=spec.max).contains(&spec.default));
        }
    }

    #[test]
    fn parses_ids() {
        assert_eq!("filterCutoff".parse::<Param>().unwrap(), Param::FilterCutoff);
        assert_eq!("wobbleRate".parse::<Param>().unwrap(), Param::WobbleRate);
        assert!(matches!(
            "cutoff".parse::<Param>(),
            Err(Error::InvalidParameter(name)) if name == "cutoff"
        ));
    }

    #[test]
    fn set_clamps() {
        let mut v = ParameterVector::default();
        assert_eq!(v.set(Param::Volume, 5.0), 1.0);
        assert_eq!(v.set(Param::Volume, -1.0), 0.0);
        assert_eq!(v.set(Param::DelayFeedback, 1.0), 0.95);
        assert_eq!(v.set(Param::WobbleRate, f32::INFINITY), 10.0);
        assert_eq!(v.set(Param::FilterCutoff, f32::NEG_INFINITY), 60.0);
    }

    #[test]
    fn nan_is_ignored() {
        let mut v = ParameterVector::default();
        assert_eq!(v.set(Param::FilterQ, f32::NAN), 10.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_clamps_values() {
        let v: ParameterVector =
            toml::from_str("values = [5.0, 1.0, 1.0, nan, -3.0, 0.22, 2.0, 0.5, 2.0]").unwrap();
        assert_eq!(v.get(Param::Volume), 1.0);
        assert_eq!(v.get(Param::FilterCutoff), 60.0);
        assert_eq!(v.get(Param::FilterQ), 10.0);
        assert_eq!(v.get(Param::Distortion), 0.0);
        assert_eq!(v.get(Param::DelayFeedback), 0.95);
        assert_eq!(v.get(Param::WobbleRate), 2.0);
    }

    #[test]
    fn defaults() {
        let v = ParameterVector::default();
        let expected = [0.9, 1.0, 120.0, 10.0, 0.0, 0.22, 0.35, 0.5, 2.0];
        for ((_, value), want) in v.iter().zip(expected) {
            assert_eq!(value, want);
        }
    }
}
