// Configuration management for OpenUMP
// Handles loading/saving settings, with sensible defaults when config is missing

use crate::audio::{clamp_volume, AudioFormat, MAX_VOLUME};
use crate::error::ConfigError;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Smallest volume change a key press may make.
pub const MIN_VOLUME_STEP: f32 = 0.001;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioSettings,
    pub library: LibraryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub initial_volume: f32,
    pub volume_step: f32,
    pub seek_step_seconds: f64,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub extensions: Vec<String>,
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub filter: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: MAX_VOLUME,
            volume_step: 0.1,
            seek_step_seconds: 10.0,
            fade_in_ms: 150,
            fade_out_ms: 100,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".to_string(), "wav".to_string(), "flac".to_string()],
            recursive: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("openump");

        Self {
            directory: data_dir.join("logs"),
            filter: "info,openump=debug".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            library: LibraryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load from the user config dir, writing the defaults there on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config.normalized())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("openump");

        Ok(config_dir.join("config.toml"))
    }

    fn normalized(mut self) -> Self {
        let volume = clamp_volume(self.audio.initial_volume);
        if volume != self.audio.initial_volume {
            warn!(
                "initial_volume {} adjusted to {}",
                self.audio.initial_volume, volume
            );
            self.audio.initial_volume = volume;
        }

        // anything finer would vanish into the bound snapping of clamp_volume
        if self.audio.volume_step.is_nan() || self.audio.volume_step < MIN_VOLUME_STEP {
            warn!("volume_step must be at least {}, using default", MIN_VOLUME_STEP);
            self.audio.volume_step = AudioSettings::default().volume_step;
        }

        if self.audio.seek_step_seconds.is_nan() || self.audio.seek_step_seconds <= 0.0 {
            warn!("seek_step_seconds must be positive, using default");
            self.audio.seek_step_seconds = AudioSettings::default().seek_step_seconds;
        }

        if self.library.extensions.is_empty() {
            self.library.extensions = LibraryConfig::default().extensions;
        }

        for ext in &self.library.extensions {
            if !AudioFormat::from_extension(ext.trim_start_matches('.')).is_supported() {
                warn!("Extension '{}' is not a known audio format, decoding may fail", ext);
            }
        }

        self
    }
}
