use super::PlaybackState;
use std::fmt;
use std::path::Path;

const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    Playing,
    Paused,
}

impl Phase {
    /// Our own paused flag wins over the backend probe.
    pub fn resolve(state: &PlaybackState, is_playing: bool) -> Self {
        if state.paused {
            Phase::Paused
        } else if is_playing {
            Phase::Playing
        } else {
            Phase::Stopped
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Stopped => "Stopped",
            Phase::Playing => "Playing",
            Phase::Paused => "Paused",
        }
    }
}

/// Ordered status fragments, rendered joined by `" | "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub phase: Phase,
    pub fragments: Vec<String>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fragments.join(SEPARATOR))
    }
}

pub struct StatusPresenter;

impl StatusPresenter {
    pub fn summarize(state: &PlaybackState, is_playing: bool) -> StatusLine {
        let phase = Phase::resolve(state, is_playing);
        let mut fragments = vec![phase.label().to_string()];

        if let Some(current) = &state.current_file {
            // the cursor wins: after a shuffle this may differ from what was loaded
            let shown = state.current_track().unwrap_or(current.as_path());
            fragments.push(format!("File: {}", base_name(shown)));
        }

        fragments.push(format!("Volume: {}%", (state.volume * 100.0).round() as u32));

        StatusLine { phase, fragments }
    }

    pub fn repeat_label(state: &PlaybackState) -> String {
        format!("Repeat: {}", on_off(state.repeat_enabled))
    }

    pub fn shuffle_label(state: &PlaybackState) -> String {
        format!("Shuffle: {}", on_off(state.shuffle_enabled))
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "On"
    } else {
        "Off"
    }
}

pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
