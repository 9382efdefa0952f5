pub mod backend;
pub mod scanner;

#[cfg(feature = "audio")]
pub mod player;

pub use backend::AudioBackend;
#[cfg(feature = "audio")]
pub use player::RodioBackend;
pub use scanner::DirectoryScanner;

/// Lowest volume level accepted by backends.
pub const MIN_VOLUME: f32 = 0.0;
/// Highest volume level accepted by backends (unity gain).
pub const MAX_VOLUME: f32 = 1.0;

// Float drift from repeated steps stays well below this
const BOUND_SNAP: f32 = 1e-5;

/// Clamp a volume level into the backend range. Levels within a hair of a
/// bound land exactly on it.
pub fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() || level <= MIN_VOLUME + BOUND_SNAP {
        return MIN_VOLUME;
    }
    if level >= MAX_VOLUME - BOUND_SNAP {
        return MAX_VOLUME;
    }
    level
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Ogg,
    Mp4,
    Wav,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "ogg" | "oga" => AudioFormat::Ogg,
            "mp4" | "m4a" | "aac" => AudioFormat::Mp4,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
