//! wubfx - terminal wobble-bass player
//!
//! Run with: cargo run -- path/to/track.wav --preset dubstep

mod app;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use wubfx::{io::WavDecoder, EngineConfig, Session};

use app::App;

#[derive(Debug, Parser)]
#[command(name = "wubfx", version, about = "Play a WAV file through the wobble chain")]
struct Args {
    /// WAV file to load
    input: PathBuf,

    /// Preset to start with (wub, dubstep, chill, house)
    #[arg(short, long)]
    preset: Option<String>,

    /// Directory capture files are written to
    #[arg(short, long, default_value = ".")]
    capture_dir: PathBuf,

    /// Engine settings as TOML; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, default_value = "wubfx.log")]
    log: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args.log)?;

    let config = load_config(args.config.as_deref())?;

    // Set up audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    let channels = stream_config.channels() as usize;
    let config = config.with_sample_rate(stream_config.sample_rate().0 as f32);

    let mut session = Session::new(config);
    let bytes = std::fs::read(&args.input)
        .wrap_err_with(|| format!("failed to read {}", args.input.display()))?;
    let source = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("input.wav")
        .to_string();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session.load(&WavDecoder, source, bytes))?;

    if let Some(preset) = &args.preset {
        session.apply_preset(preset)?;
    }

    let mut processor = session
        .take_processor()
        .ok_or_else(|| eyre!("signal graph was not built"))?;
    info!(
        sample_rate = processor.sample_rate(),
        channels, "opening output stream"
    );

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| processor.render_interleaved(data, channels),
        |err| error!("audio stream error: {}", err),
        None,
    )?;
    stream.play()?;

    session.play();

    let mut terminal = ratatui::init();
    let result = App::new(session, args.capture_dir).run(&mut terminal);
    ratatui::restore();

    drop(stream);
    result
}

fn init_tracing(path: &Path) -> EyreResult<()> {
    let file = File::create(path).wrap_err("failed to create log file")?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wubfx=info"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}

fn load_config(path: Option<&Path>) -> EyreResult<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&contents)
        .wrap_err_with(|| format!("invalid engine config in {}", path.display()))?;
    Ok(config)
}
