pub mod capture; // Tap-stream recorder and capture file naming
pub mod config;
pub mod controller; // Parameter vector -> live stage dispatch
pub mod dsp;
pub mod error;
pub mod graph; // Stages, wiring and the realtime processor
pub mod io;
pub mod params;
pub mod preset;
pub mod session;
pub mod transport; // Playback unit lifecycle and elapsed-time projection

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use params::{Param, ParameterVector};
pub use session::Session;

pub const MAX_BLOCK_SIZE: usize = 2048;
