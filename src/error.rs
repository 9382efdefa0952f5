// Error types shared across the player
// Library seams return these; the binary and the TUI shell wrap them in anyhow

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by an audio engine implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to open '{}': {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported audio format or corrupted file '{}': {}", .path.display(), .reason)]
    Decode { path: PathBuf, reason: String },

    #[error("no audio output device available: {0}")]
    Output(String),

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("nothing loaded")]
    NothingLoaded,
}

/// Errors reported by the playlist controller.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("'{}' is not a directory", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("could not load '{}': {}", .path.display(), .source)]
    Load {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    #[error("audio backend error: {0}")]
    Backend(#[from] BackendError),
}

impl PlayerError {
    pub fn is_load_error(&self) -> bool {
        matches!(self, PlayerError::Load { .. })
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl From<ScanError> for PlayerError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotADirectory(path) => PlayerError::InvalidDirectory(path),
            ScanError::Walk(e) => PlayerError::InvalidDirectory(
                e.path().map(|p| p.to_path_buf()).unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find config directory")]
    NoConfigDir,

    #[error("failed to access config file '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
