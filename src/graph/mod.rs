//! The effect chain as realtime graph nodes.
//!
//! Each stage of the chain is a node that renders one block in place. Nodes
//! are composed with `.through()` (serial) and `.modulate()` (parameter
//! modulation), and read their settings from shared parameter cells that the
//! control side writes. `SignalGraph::build` wires the chain by hand; the
//! `topology` table describes the same wiring as data, and the build checks
//! itself against it in debug builds.

/// Analyser stage and the tap point it feeds.
pub mod analyser;
/// Feedback delay stage.
pub mod delay;
/// Entry point and playback units.
pub mod entry;
/// Fluent combinators (`.through()`, `.modulate()`).
pub mod extensions;
/// Resonant lowpass stage.
pub mod filter;
/// Output volume and wobble depth.
pub mod gain;
/// Wobble oscillator.
pub mod lfo;
/// Connect modulation sources to node parameters.
pub mod modulate;
/// Core traits shared by all graph nodes.
pub mod node;
/// Lock-free parameter cells.
pub mod param;
/// Builds and owns the chain; hands the audio half to the host.
pub mod signal_graph;
/// Serial chaining of two nodes (source → effect).
pub mod through;
/// The fixed wiring as data, with its invariant checks.
pub mod topology;
/// Table-driven distortion stage.
pub mod waveshaper;

pub use analyser::{TapPoint, TapStream};
pub use signal_graph::{GraphProcessor, SignalGraph, StageHandles};
pub use topology::StageKind;
