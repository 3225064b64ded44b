use thiserror::Error;

/// Everything the engine can report back to its caller.
///
/// None of these are fatal: a failed load or capture toggle leaves the
/// session exactly as it was.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not decode audio: {0}")]
    Decode(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("cannot start capture: {0}")]
    CaptureStart(String),

    #[error("cannot stop capture: no capture is active")]
    CaptureStop,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
