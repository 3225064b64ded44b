//! Real-world scenario benchmarks.
//!
//! The complete chain as a session runs it, with each shipped preset.

mod chain;

pub use chain::bench_chain;
