// OpenUMP - terminal audio player
// Point it at a folder, get a playlist with transport controls

use anyhow::Result;
use clap::Parser;
use openump::audio::player::AudioConfig;
use openump::audio::RodioBackend;
use openump::error::PlayerError;
use openump::ui::App;
use openump::{logging, Config, DirectoryScanner, InputRouter, PlaylistController};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "openump")]
#[command(version, about = "Terminal audio player for a folder of music")]
struct Args {
    /// Directory to play (defaults to the current directory)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Use this config file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Bail out before touching the terminal
    if !args.directory.is_dir() {
        return Err(PlayerError::InvalidDirectory(args.directory).into());
    }
    let directory = std::fs::canonicalize(&args.directory).unwrap_or(args.directory);

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _log_guard = logging::init_logging(&config.logging, args.dev)?;
    info!("OpenUMP starting in {}", directory.display());

    let playlist = DirectoryScanner::new()
        .with_extensions(&config.library.extensions)
        .recursive(config.library.recursive)
        .list(&directory)
        .map_err(PlayerError::from)?;
    info!("Found {} tracks", playlist.len());

    // ALSA likes to complain on stderr, which would tear up the TUI
    #[cfg(unix)]
    let _stderr_redirect = if args.dev {
        None
    } else {
        Some(logging::StderrRedirect::to_null()?)
    };

    let backend = RodioBackend::new(AudioConfig::from(&config))?;
    let controller = PlaylistController::new(backend, playlist, config.audio.initial_volume);
    let router = InputRouter::from_settings(&config.audio);

    let mut app = App::new(directory, controller, router)?;
    app.run().await?;

    Ok(())
}
