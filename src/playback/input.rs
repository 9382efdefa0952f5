// Key -> intent routing
// Bindings are layout-agnostic: the Cyrillic keys sit where the Latin ones do on ЙЦУКЕН

use super::PlaylistController;
use crate::audio::AudioBackend;
use crate::config::AudioSettings;
use crate::error::Result;
use std::collections::HashMap;
use tracing::debug;

/// Toolkit-independent key symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    TogglePlayPause,
    Stop,
    SeekBackward,
    SeekForward,
    ToggleRepeat,
    ToggleShuffle,
    VolumeUp,
    VolumeDown,
    NextTrack,
    PreviousTrack,
}

/// What the shell should do after an intent was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const DEFAULT_BINDINGS: &[(Key, Intent)] = &[
    (Key::Char('q'), Intent::Quit),
    (Key::Char('Q'), Intent::Quit),
    (Key::Char('й'), Intent::Quit),
    (Key::Char('Й'), Intent::Quit),
    (Key::Esc, Intent::Quit),
    (Key::Char('p'), Intent::TogglePlayPause),
    (Key::Char('P'), Intent::TogglePlayPause),
    (Key::Char('з'), Intent::TogglePlayPause),
    (Key::Char('З'), Intent::TogglePlayPause),
    (Key::Char(' '), Intent::TogglePlayPause),
    (Key::Char('s'), Intent::Stop),
    (Key::Char('S'), Intent::Stop),
    (Key::Char('ы'), Intent::Stop),
    (Key::Char('Ы'), Intent::Stop),
    (Key::Left, Intent::SeekBackward),
    (Key::Right, Intent::SeekForward),
    (Key::Char('r'), Intent::ToggleRepeat),
    (Key::Char('R'), Intent::ToggleRepeat),
    (Key::Char('к'), Intent::ToggleRepeat),
    (Key::Char('К'), Intent::ToggleRepeat),
    (Key::Char('m'), Intent::ToggleShuffle),
    (Key::Char('M'), Intent::ToggleShuffle),
    (Key::Char('ь'), Intent::ToggleShuffle),
    (Key::Char('Ь'), Intent::ToggleShuffle),
    (Key::Char('+'), Intent::VolumeUp),
    (Key::Char('='), Intent::VolumeUp),
    (Key::Char('-'), Intent::VolumeDown),
    (Key::Char('_'), Intent::VolumeDown),
    (Key::Char('n'), Intent::NextTrack),
    (Key::Char('N'), Intent::NextTrack),
    (Key::Char('т'), Intent::NextTrack),
    (Key::Char('Т'), Intent::NextTrack),
    (Key::Char('b'), Intent::PreviousTrack),
    (Key::Char('B'), Intent::PreviousTrack),
    (Key::Char('и'), Intent::PreviousTrack),
    (Key::Char('И'), Intent::PreviousTrack),
];

#[derive(Debug, Clone)]
pub struct InputRouter {
    bindings: HashMap<Key, Intent>,
    seek_step: f64,
    volume_step: f32,
}

impl InputRouter {
    pub fn new(seek_step: f64, volume_step: f32) -> Self {
        Self {
            bindings: DEFAULT_BINDINGS.iter().copied().collect(),
            seek_step,
            volume_step,
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(settings.seek_step_seconds, settings.volume_step)
    }

    pub fn bind(&mut self, key: Key, intent: Intent) {
        self.bindings.insert(key, intent);
    }

    pub fn route(&self, key: Key) -> Option<Intent> {
        self.bindings.get(&key).copied()
    }

    /// Route and dispatch in one go; unmapped keys do nothing.
    pub fn handle_key<B: AudioBackend>(
        &self,
        key: Key,
        controller: &mut PlaylistController<B>,
    ) -> Result<Flow> {
        match self.route(key) {
            Some(intent) => self.dispatch(intent, controller),
            None => Ok(Flow::Continue),
        }
    }

    /// Quit goes back to the shell, everything else to the controller.
    pub fn dispatch<B: AudioBackend>(
        &self,
        intent: Intent,
        controller: &mut PlaylistController<B>,
    ) -> Result<Flow> {
        debug!("Dispatching {:?}", intent);

        match intent {
            Intent::Quit => return Ok(Flow::Quit),
            Intent::TogglePlayPause => controller.toggle_play_pause()?,
            Intent::Stop => controller.stop()?,
            Intent::SeekBackward => controller.seek(-self.seek_step)?,
            Intent::SeekForward => controller.seek(self.seek_step)?,
            Intent::ToggleRepeat => controller.toggle_repeat(),
            Intent::ToggleShuffle => controller.toggle_shuffle(),
            Intent::VolumeUp => controller.adjust_volume(self.volume_step)?,
            Intent::VolumeDown => controller.adjust_volume(-self.volume_step)?,
            Intent::NextTrack => controller.next_track()?,
            Intent::PreviousTrack => controller.previous_track()?,
        }

        Ok(Flow::Continue)
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::from_settings(&AudioSettings::default())
    }
}

#[cfg(feature = "tui")]
impl From<crossterm::event::KeyEvent> for Key {
    fn from(event: crossterm::event::KeyEvent) -> Self {
        use crossterm::event::KeyCode;

        match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Esc => Key::Esc,
            _ => Key::Other,
        }
    }
}
