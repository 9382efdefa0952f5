use super::backend::AudioBackend;
use super::{clamp_volume, MAX_VOLUME};
use crate::error::BackendError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

type FileDecoder = Decoder<BufReader<File>>;

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub volume: f32,            // 0.0 to 1.0
    pub fade_in_duration: u64,  // milliseconds for smooth track start
    pub fade_out_duration: u64, // milliseconds for smooth track stop
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: MAX_VOLUME,
            fade_in_duration: 150,
            fade_out_duration: 100,
        }
    }
}

impl From<&crate::config::Config> for AudioConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            volume: clamp_volume(config.audio.initial_volume),
            fade_in_duration: config.audio.fade_in_ms,
            fade_out_duration: config.audio.fade_out_ms,
        }
    }
}

/// rodio-backed engine. A fresh `Sink` is built for every `play`, so playing
/// an already-playing or stopped track starts it over from the top.
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
    pending: Option<FileDecoder>,
    config: AudioConfig,
}

impl RodioBackend {
    pub fn new(config: AudioConfig) -> Result<Self, BackendError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| BackendError::Output(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            loaded: None,
            pending: None,
            config,
        })
    }

    fn decode(path: &Path) -> Result<FileDecoder, BackendError> {
        let file = File::open(path).map_err(|source| BackendError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Decoder::new(BufReader::new(file)).map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Ramp from silence to the configured volume
    fn fade_in(&self, sink: &Sink) {
        let target_volume = self.config.volume;
        let fade_duration = self.config.fade_in_duration;

        if fade_duration == 0 {
            sink.set_volume(target_volume);
            return;
        }

        sink.set_volume(0.0);

        let fade_steps = 10;
        let step_duration = fade_duration / fade_steps;
        let volume_step = target_volume / fade_steps as f32;

        for step in 1..=fade_steps {
            sink.set_volume(volume_step * step as f32);
            std::thread::sleep(Duration::from_millis(step_duration));
        }

        sink.set_volume(target_volume);
    }

    fn fade_out(&self, sink: &Sink) {
        let current_volume = self.config.volume;
        let fade_duration = self.config.fade_out_duration;

        if fade_duration == 0 || sink.is_paused() {
            return;
        }

        let fade_steps = 10;
        let step_duration = fade_duration / fade_steps;
        let volume_step = current_volume / fade_steps as f32;

        for step in 1..=fade_steps {
            let new_volume = current_volume - (volume_step * step as f32);
            sink.set_volume(new_volume.max(0.0));
            std::thread::sleep(Duration::from_millis(step_duration));
        }

        sink.set_volume(0.0);
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<(), BackendError> {
        // Decode up front so a bad file is rejected here, not on play
        let source = Self::decode(path)?;

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }

        self.pending = Some(source);
        self.loaded = Some(path.to_path_buf());
        info!("Loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        let path = self.loaded.clone().ok_or(BackendError::NothingLoaded)?;

        let source = match self.pending.take() {
            Some(source) => source,
            None => Self::decode(&path)?,
        };

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| BackendError::Output(e.to_string()))?;
        sink.append(source);
        self.fade_in(&sink);
        self.sink = Some(sink);

        debug!("Playing {}", path.display());
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NothingLoaded)?;
        sink.pause();
        Ok(())
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NothingLoaded)?;
        sink.play();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        if let Some(sink) = self.sink.take() {
            self.fade_out(&sink);
            sink.stop();
        }
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NothingLoaded)?;
        sink.try_seek(position)
            .map_err(|e| BackendError::Seek(e.to_string()))
    }

    fn set_volume(&mut self, level: f32) -> Result<(), BackendError> {
        self.config.volume = clamp_volume(level);

        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.config.volume);
        }

        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|sink| !sink.empty() && !sink.is_paused())
            .unwrap_or(false)
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos())
            .unwrap_or_default()
    }
}
