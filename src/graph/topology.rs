//! The fixed wiring of the effects chain, as data.
//!
//! `SignalGraph::build` wires the nodes by hand; this table is the reference
//! it is checked against. [`validate`] enforces the structural rules and
//! [`signal_path`] gives the serial order `build` must match, so a wiring
//! mistake is caught in tests rather than heard as silence or a runaway
//! feedback loop. The entry and tap queries also read from here.

use std::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Filter,
    WaveShaper,
    Delay,
    FeedbackGain,
    Analyser,
    Gain,
    Oscillator,
    OscillatorGain,
}

impl StageKind {
    pub const ALL: [StageKind; 8] = [
        StageKind::Filter,
        StageKind::WaveShaper,
        StageKind::Delay,
        StageKind::FeedbackGain,
        StageKind::Analyser,
        StageKind::Gain,
        StageKind::Oscillator,
        StageKind::OscillatorGain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Filter => "filter",
            StageKind::WaveShaper => "waveshaper",
            StageKind::Delay => "delay",
            StageKind::FeedbackGain => "feedback-gain",
            StageKind::Analyser => "analyser",
            StageKind::Gain => "gain",
            StageKind::Oscillator => "oscillator",
            StageKind::OscillatorGain => "oscillator-gain",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Where playback units connect
    Entry,
    Stage(StageKind),
    /// A stage parameter driven by a modulation signal
    Param(StageKind, &'static str),
    /// The speakers
    Output,
    /// Read-only consumers: visualizer and recorder
    Tap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: Endpoint,
    pub to: Endpoint,
}

const fn edge(from: Endpoint, to: Endpoint) -> Edge {
    Edge { from, to }
}

use Endpoint::{Entry, Output, Param, Stage, Tap};
use StageKind::*;

/// Every connection in the chain.
pub const TOPOLOGY: &[Edge] = &[
    // Signal path
    edge(Entry, Stage(Filter)),
    edge(Stage(Filter), Stage(WaveShaper)),
    edge(Stage(WaveShaper), Stage(Delay)),
    edge(Stage(Delay), Stage(Analyser)),
    edge(Stage(Analyser), Stage(Gain)),
    edge(Stage(Gain), Output),
    edge(Stage(Analyser), Tap),
    // Feedback loop
    edge(Stage(Delay), Stage(FeedbackGain)),
    edge(Stage(FeedbackGain), Stage(Delay)),
    // Wobble side-chain
    edge(Stage(Oscillator), Stage(OscillatorGain)),
    edge(Stage(OscillatorGain), Param(Filter, "cutoff")),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    EntryCount(usize),
    TapCount(usize),
    /// A cycle that does not pass through the delay stage
    ZeroLatencyLoop(StageKind),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::EntryCount(n) => write!(f, "expected one entry point, found {}", n),
            TopologyError::TapCount(n) => write!(f, "expected one tap point, found {}", n),
            TopologyError::ZeroLatencyLoop(stage) => {
                write!(f, "loop through {} bypasses the delay stage", stage)
            }
        }
    }
}

impl std::error::Error for TopologyError {}

/// The stage a topology's entry point feeds.
pub fn entry_stage(edges: &[Edge]) -> Option<StageKind> {
    edges.iter().find_map(|e| match (e.from, e.to) {
        (Entry, Stage(kind)) => Some(kind),
        _ => None,
    })
}

/// The stage a topology's tap reads from.
pub fn tap_stage(edges: &[Edge]) -> Option<StageKind> {
    edges.iter().find_map(|e| match (e.from, e.to) {
        (Stage(kind), Tap) => Some(kind),
        _ => None,
    })
}

/// Stages on the main signal path from the entry point to the output, in
/// order. At a fork the first listed edge is the main path.
pub fn signal_path(edges: &[Edge]) -> Vec<StageKind> {
    let mut path = Vec::new();
    let mut at = Entry;
    while path.len() <= edges.len() {
        let next = edges.iter().find_map(|e| match e.to {
            Stage(kind) if e.from == at => Some(Stage(kind)),
            Output if e.from == at => Some(Output),
            _ => None,
        });
        match next {
            Some(Stage(kind)) => {
                path.push(kind);
                at = Stage(kind);
            }
            _ => break,
        }
    }
    path
}

/// Check the structural invariants: one entry, one tap, and every loop
/// passes through the delay stage.
pub fn validate(edges: &[Edge]) -> Result<(), TopologyError> {
    let entries = edges.iter().filter(|e| e.from == Entry).count();
    if entries != 1 {
        return Err(TopologyError::EntryCount(entries));
    }
    let taps = edges.iter().filter(|e| e.to == Tap).count();
    if taps != 1 {
        return Err(TopologyError::TapCount(taps));
    }

    // With the delay stage cut out, what remains must be acyclic
    for &start in StageKind::ALL.iter().filter(|&&k| k != Delay) {
        let mut stack = vec![start];
        let mut seen = Vec::new();
        while let Some(current) = stack.pop() {
            for e in edges {
                let (Stage(from), Stage(to)) = (e.from, e.to) else {
                    continue;
                };
                if from != current || to == Delay {
                    continue;
                }
                if to == start {
                    return Err(TopologyError::ZeroLatencyLoop(start));
                }
                if !seen.contains(&to) {
                    seen.push(to);
                    stack.push(to);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_topology_is_valid() {
        assert_eq!(validate(TOPOLOGY), Ok(()));
        assert_eq!(entry_stage(TOPOLOGY), Some(Filter));
        assert_eq!(tap_stage(TOPOLOGY), Some(Analyser));
    }

    #[test]
    fn test_rejects_second_entry() {
        let mut edges = TOPOLOGY.to_vec();
        edges.push(edge(Entry, Stage(Gain)));
        assert_eq!(validate(&edges), Err(TopologyError::EntryCount(2)));
    }

    #[test]
    fn test_rejects_missing_tap() {
        let edges: Vec<Edge> = TOPOLOGY.iter().copied().filter(|e| e.to != Tap).collect();
        assert_eq!(validate(&edges), Err(TopologyError::TapCount(0)));
    }

    #[test]
    fn test_rejects_feedback_that_skips_delay() {
        let mut edges = TOPOLOGY.to_vec();
        edges.push(edge(Stage(Gain), Stage(FeedbackGain)));
        edges.push(edge(Stage(FeedbackGain), Stage(Analyser)));
        assert!(matches!(
            validate(&edges),
            Err(TopologyError::ZeroLatencyLoop(_))
        ));
    }

    #[test]
    fn test_signal_path_follows_main_chain() {
        assert_eq!(
            signal_path(TOPOLOGY),
            vec![Filter, WaveShaper, Delay, Analyser, Gain]
        );
    }

    #[test]
    fn test_wobble_drives_cutoff_not_the_signal() {
        let targets: Vec<Endpoint> = TOPOLOGY
            .iter()
            .filter(|e| e.from == Stage(OscillatorGain))
            .map(|e| e.to)
            .collect();
        assert_eq!(targets, vec![Param(Filter, "cutoff")]);
    }
}
