use crate::audio::{clamp_volume, AudioBackend};
use crate::error::{PlayerError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything the player knows about the session. Only the controller mutates it.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub current_file: Option<PathBuf>,
    pub paused: bool,
    pub volume: f32,
    pub repeat_enabled: bool,
    pub shuffle_enabled: bool,
    pub playlist: Vec<PathBuf>,
    pub current_index: usize,
    // set by a successful play, cleared by stop and by running off the end
    pub(crate) active: bool,
}

impl PlaybackState {
    fn new(mut playlist: Vec<PathBuf>, volume: f32) -> Self {
        playlist.sort();
        Self {
            current_file: None,
            paused: false,
            volume: clamp_volume(volume),
            repeat_enabled: false,
            shuffle_enabled: false,
            playlist,
            current_index: 0,
            active: false,
        }
    }

    /// Track the playlist cursor points at, if any.
    pub fn current_track(&self) -> Option<&Path> {
        self.playlist.get(self.current_index).map(PathBuf::as_path)
    }
}

/// Turns transport intents into backend calls and keeps `PlaybackState`
/// consistent with what the backend actually did.
///
/// State is only updated after the backend call it depends on succeeded, so a
/// failed operation leaves the previous state in place.
pub struct PlaylistController<B: AudioBackend> {
    backend: B,
    state: PlaybackState,
    rng: StdRng,
}

impl<B: AudioBackend> PlaylistController<B> {
    pub fn new(backend: B, playlist: Vec<PathBuf>, volume: f32) -> Self {
        Self::with_rng(backend, playlist, volume, StdRng::from_entropy())
    }

    pub fn with_rng(backend: B, playlist: Vec<PathBuf>, volume: f32, rng: StdRng) -> Self {
        let state = PlaybackState::new(playlist, volume);
        info!("Playlist ready with {} tracks", state.playlist.len());
        Self { backend, state, rng }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_playing(&self) -> bool {
        self.backend.is_playing()
    }

    pub fn load_track(&mut self, path: &Path) -> Result<()> {
        if let Err(source) = self.backend.load(path) {
            warn!("Failed to load {}: {}", path.display(), source);
            return Err(PlayerError::Load {
                path: path.to_path_buf(),
                source,
            });
        }

        self.state.current_file = Some(path.to_path_buf());
        self.state.paused = false;
        self.state.active = false;

        // Volume is a player setting, keep it across tracks
        if let Err(e) = self.backend.set_volume(self.state.volume) {
            warn!("Could not apply volume to {}: {}", path.display(), e);
        }

        info!("Loaded {}", path.display());
        Ok(())
    }

    /// Resume if paused, otherwise (re)start the loaded track from the top.
    pub fn play(&mut self) -> Result<()> {
        if self.state.current_file.is_none() {
            debug!("play ignored, nothing loaded");
            return Ok(());
        }

        if self.state.paused {
            self.backend.resume()?;
            self.state.paused = false;
        } else {
            self.backend.play()?;
        }

        self.state.active = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.state.paused || !self.backend.is_playing() {
            return Ok(());
        }

        self.backend.pause()?;
        self.state.paused = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.backend.stop()?;
        self.state.paused = false;
        self.state.active = false;
        Ok(())
    }

    /// Play/pause button: with a track loaded, play when paused or idle,
    /// pause when audible.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state.current_file.is_none() {
            return Ok(());
        }

        if self.state.paused || !self.backend.is_playing() {
            self.play()
        } else {
            self.pause()
        }
    }

    /// Set an absolute level, clamped to the backend range.
    pub fn set_volume(&mut self, level: f32) -> Result<()> {
        let level = clamp_volume(level);
        self.backend.set_volume(level)?;
        self.state.volume = level;
        Ok(())
    }

    pub fn adjust_volume(&mut self, delta: f32) -> Result<()> {
        self.set_volume(self.state.volume + delta)
    }

    /// Move relative to the current position. Never seeks before the start;
    /// seeking past the end is left to the backend.
    pub fn seek(&mut self, delta_seconds: f64) -> Result<()> {
        if self.state.current_file.is_none() {
            return Ok(());
        }

        let current = self.backend.position().as_secs_f64();
        let target = (current + delta_seconds).max(0.0);
        let Ok(position) = Duration::try_from_secs_f64(target) else {
            debug!("seek target {} out of range", target);
            return Ok(());
        };

        self.backend.seek(position)?;
        debug!("Seeked to {:.1}s", target);
        Ok(())
    }

    pub fn toggle_repeat(&mut self) {
        self.state.repeat_enabled = !self.state.repeat_enabled;
        info!("Repeat {}", if self.state.repeat_enabled { "on" } else { "off" });
    }

    /// Shuffles or re-sorts the playlist. The cursor keeps its numeric
    /// position, so it may point at a different track afterwards.
    pub fn toggle_shuffle(&mut self) {
        self.state.shuffle_enabled = !self.state.shuffle_enabled;

        if self.state.shuffle_enabled {
            self.state.playlist.shuffle(&mut self.rng);
        } else {
            self.state.playlist.sort();
        }

        info!("Shuffle {}", if self.state.shuffle_enabled { "on" } else { "off" });
    }

    pub fn next_track(&mut self) -> Result<()> {
        let len = self.state.playlist.len();
        if len == 0 {
            return Ok(());
        }

        let index = if self.state.shuffle_enabled {
            self.rng.gen_range(0..len)
        } else {
            (self.state.current_index + 1) % len
        };

        self.jump_to(index)
    }

    /// Under shuffle this picks a random track too; there is no history.
    pub fn previous_track(&mut self) -> Result<()> {
        let len = self.state.playlist.len();
        if len == 0 {
            return Ok(());
        }

        let index = if self.state.shuffle_enabled {
            self.rng.gen_range(0..len)
        } else {
            (self.state.current_index + len - 1) % len
        };

        self.jump_to(index)
    }

    /// Load and play the playlist entry at `index` (list selection). The
    /// cursor only moves if the load succeeds.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        let Some(path) = self.state.playlist.get(index).cloned() else {
            return Ok(());
        };

        self.load_track(&path)?;
        self.state.current_index = index;
        self.play()
    }

    /// Detects a track that ran out on its own and moves on: repeat replays
    /// it, shuffle picks a random one, otherwise the next track plays until
    /// the end of the playlist. Unloadable files are skipped, trying each
    /// remaining entry at most once. Returns true when it acted.
    pub fn poll_track_end(&mut self) -> Result<bool> {
        if !self.state.active || self.state.paused || self.backend.is_playing() {
            return Ok(false);
        }

        debug!("Track finished");
        self.state.active = false;

        let len = self.state.playlist.len();
        if self.state.repeat_enabled {
            self.play()?;
        } else if self.state.shuffle_enabled {
            let picks: Vec<usize> = (0..len).map(|_| self.rng.gen_range(0..len)).collect();
            self.play_first_loadable(picks)?;
        } else if self.state.current_index + 1 < len {
            self.play_first_loadable(self.state.current_index + 1..len)?;
        } else {
            info!("End of playlist");
        }

        Ok(true)
    }

    // Backend failures other than a bad file end the attempt right away.
    fn play_first_loadable(&mut self, candidates: impl IntoIterator<Item = usize>) -> Result<()> {
        let mut last_error = None;

        for index in candidates {
            match self.jump_to(index) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_load_error() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        match last_error {
            Some(e) => {
                info!("No playable track left");
                Err(e)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::testing::{Call, RecordingBackend};
    use crate::playback::StatusPresenter;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn controller(names: &[&str]) -> PlaylistController<RecordingBackend> {
        PlaylistController::with_rng(
            RecordingBackend::new(),
            paths(names),
            1.0,
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_initial_state_is_sorted() {
        let ctl = controller(&["b.mp3", "a.mp3", "c.wav"]);
        let state = ctl.state();

        assert_eq!(state.playlist, paths(&["a.mp3", "b.mp3", "c.wav"]));
        assert_eq!(state.current_index, 0);
        assert!(state.current_file.is_none());
        assert!(!state.paused);
        assert_eq!(state.volume, 1.0);
    }

    #[test]
    fn test_load_track_success() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.load_track(Path::new("a.mp3")).unwrap();

        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));
        assert_eq!(
            ctl.backend.take_calls(),
            vec![Call::Load(PathBuf::from("a.mp3")), Call::SetVolume(1.0)]
        );
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let mut ctl = controller(&["a.mp3"]);

        let err = ctl.load_track(Path::new("missing.mp3")).unwrap_err();
        assert!(err.is_load_error());
        assert!(ctl.state().current_file.is_none());

        ctl.load_track(Path::new("a.mp3")).unwrap();
        assert!(ctl.load_track(Path::new("missing.mp3")).is_err());
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));
    }

    #[test]
    fn test_play_without_track_is_noop() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.play().unwrap();
        assert!(ctl.backend.calls.is_empty());
    }

    #[test]
    fn test_play_restarts_when_already_playing() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.play().unwrap();
        ctl.play().unwrap();

        let plays = ctl
            .backend
            .calls
            .iter()
            .filter(|c| **c == Call::Play)
            .count();
        assert_eq!(plays, 2);
    }

    #[test]
    fn test_pause_then_play_resumes() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.play().unwrap();
        ctl.backend.take_calls();

        ctl.pause().unwrap();
        assert!(ctl.state().paused);
        assert!(!ctl.is_playing());

        ctl.play().unwrap();
        assert!(!ctl.state().paused);
        assert_eq!(ctl.backend.take_calls(), vec![Call::Pause, Call::Resume]);
    }

    #[test]
    fn test_pause_noop_without_track_or_when_idle() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.pause().unwrap();
        assert!(!ctl.state().paused);
        assert!(ctl.backend.calls.is_empty());

        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.backend.take_calls();
        ctl.pause().unwrap();
        assert!(!ctl.state().paused);
        assert!(ctl.backend.calls.is_empty());
    }

    #[test]
    fn test_pause_twice_only_pauses_once() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.play().unwrap();
        ctl.pause().unwrap();
        ctl.pause().unwrap();

        let pauses = ctl
            .backend
            .calls
            .iter()
            .filter(|c| **c == Call::Pause)
            .count();
        assert_eq!(pauses, 1);
    }

    #[test]
    fn test_stop_clears_pause() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.play().unwrap();
        ctl.pause().unwrap();
        ctl.stop().unwrap();

        assert!(!ctl.state().paused);
        assert!(!ctl.is_playing());

        // after stop, play starts fresh instead of resuming
        ctl.backend.take_calls();
        ctl.play().unwrap();
        assert_eq!(ctl.backend.take_calls(), vec![Call::Play]);
    }

    #[test]
    fn test_backend_failure_keeps_state() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.play().unwrap();
        ctl.pause().unwrap();

        ctl.backend.fail_transport = true;
        let err = ctl.stop().unwrap_err();
        assert!(matches!(err, PlayerError::Backend(_)));
        assert!(ctl.state().paused);

        assert!(ctl.set_volume(0.2).is_err());
        assert_eq!(ctl.state().volume, 1.0);
    }

    #[test]
    fn test_toggle_play_pause() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.toggle_play_pause().unwrap();
        assert!(ctl.backend.calls.is_empty());

        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.toggle_play_pause().unwrap();
        assert!(ctl.is_playing());
        ctl.toggle_play_pause().unwrap();
        assert!(ctl.state().paused);
        ctl.toggle_play_pause().unwrap();
        assert!(ctl.is_playing());
        assert!(!ctl.state().paused);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.adjust_volume(0.1).unwrap();
        assert_eq!(ctl.state().volume, 1.0);

        for _ in 0..15 {
            ctl.adjust_volume(-0.1).unwrap();
            assert!(ctl.state().volume >= 0.0);
        }
        assert_eq!(ctl.state().volume, 0.0);
        assert_eq!(ctl.backend.calls.last(), Some(&Call::SetVolume(0.0)));

        ctl.adjust_volume(0.1).unwrap();
        ctl.adjust_volume(0.1).unwrap();
        ctl.adjust_volume(0.1).unwrap();
        assert!((ctl.state().volume - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_small_volume_steps_accumulate() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.set_volume(0.5).unwrap();

        for _ in 0..10 {
            ctl.adjust_volume(0.004).unwrap();
        }
        assert!((ctl.state().volume - 0.54).abs() < 1e-5);

        for _ in 0..10 {
            ctl.adjust_volume(-0.004).unwrap();
        }
        assert!((ctl.state().volume - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_seek_clamps_to_start() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.seek(-10.0).unwrap();
        assert!(ctl.backend.calls.is_empty());

        ctl.load_track(Path::new("a.mp3")).unwrap();
        ctl.play().unwrap();
        ctl.backend.position = Duration::from_secs(5);
        ctl.backend.take_calls();

        ctl.seek(-10.0).unwrap();
        assert_eq!(ctl.backend.take_calls(), vec![Call::Seek(Duration::ZERO)]);

        ctl.seek(10.0).unwrap();
        assert_eq!(
            ctl.backend.take_calls(),
            vec![Call::Seek(Duration::from_secs(10))]
        );
    }

    #[test]
    fn test_toggle_repeat_is_pure() {
        let mut ctl = controller(&["a.mp3"]);
        ctl.toggle_repeat();
        assert!(ctl.state().repeat_enabled);
        ctl.toggle_repeat();
        assert!(!ctl.state().repeat_enabled);
        assert!(ctl.backend.calls.is_empty());
    }

    #[test]
    fn test_shuffle_roundtrip_restores_sorted_order() {
        let names = ["d.mp3", "b.mp3", "e.flac", "a.mp3", "c.wav", "f.mp3"];
        let mut sorted = paths(&names);
        sorted.sort();

        for seed in 0..20u64 {
            let mut ctl = PlaylistController::with_rng(
                RecordingBackend::new(),
                paths(&names),
                1.0,
                StdRng::seed_from_u64(seed),
            );
            let toggles = 2 * (seed as usize % 4 + 1);
            for i in 0..toggles {
                ctl.toggle_shuffle();
                if ctl.state().shuffle_enabled {
                    let mut copy = ctl.state().playlist.clone();
                    copy.sort();
                    assert_eq!(copy, sorted, "toggle {} is a permutation", i);
                }
            }
            assert!(!ctl.state().shuffle_enabled);
            assert_eq!(ctl.state().playlist, sorted);
        }
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let mut ctl = controller(&["a.mp3", "b.mp3", "c.wav"]);
        ctl.jump_to(2).unwrap();

        ctl.next_track().unwrap();
        assert_eq!(ctl.state().current_index, 0);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));

        ctl.previous_track().unwrap();
        assert_eq!(ctl.state().current_index, 2);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("c.wav")));
        assert!(ctl.is_playing());
    }

    #[test]
    fn test_navigation_on_empty_playlist_is_noop() {
        let mut ctl = controller(&[]);
        ctl.next_track().unwrap();
        ctl.previous_track().unwrap();
        ctl.jump_to(0).unwrap();

        assert_eq!(ctl.state().current_index, 0);
        assert!(ctl.backend.calls.is_empty());
    }

    #[test]
    fn test_shuffled_navigation_stays_in_bounds() {
        let mut ctl = controller(&["a.mp3", "b.mp3", "c.wav", "d.mp3"]);
        ctl.toggle_shuffle();

        for _ in 0..50 {
            ctl.next_track().unwrap();
            assert!(ctl.state().current_index < 4);
            ctl.previous_track().unwrap();
            assert!(ctl.state().current_index < 4);
        }
        assert!(ctl.is_playing());
    }

    #[test]
    fn test_scenario_next_then_shuffle_keeps_index() {
        let mut ctl = controller(&["b.mp3", "a.mp3", "c.wav"]);

        ctl.next_track().unwrap();
        assert_eq!(ctl.state().current_index, 1);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("b.mp3")));
        assert!(ctl.is_playing());

        ctl.toggle_shuffle();
        assert_eq!(ctl.state().current_index, 1);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("b.mp3")));
        assert_eq!(
            ctl.state().current_track(),
            Some(ctl.state().playlist[1].as_path())
        );
    }

    #[test]
    fn test_failed_next_leaves_state_alone() {
        let mut ctl = controller(&["a.mp3", "b-missing.mp3", "c.mp3"]);
        ctl.jump_to(0).unwrap();
        let before = StatusPresenter::summarize(ctl.state(), ctl.is_playing()).to_string();

        let err = ctl.next_track().unwrap_err();
        assert!(err.is_load_error());
        assert_eq!(ctl.state().current_index, 0);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));
        assert!(ctl.is_playing());

        let after = StatusPresenter::summarize(ctl.state(), ctl.is_playing()).to_string();
        assert_eq!(after, before);
        assert_eq!(after, "Playing | File: a.mp3 | Volume: 100%");
    }

    #[test]
    fn test_failed_previous_leaves_state_alone() {
        let mut ctl = controller(&["a.mp3", "b.mp3", "c-missing.mp3"]);
        ctl.jump_to(0).unwrap();

        assert!(ctl.previous_track().is_err());
        assert_eq!(ctl.state().current_index, 0);

        let status = StatusPresenter::summarize(ctl.state(), ctl.is_playing());
        assert_eq!(status.to_string(), "Playing | File: a.mp3 | Volume: 100%");
    }

    #[test]
    fn test_jump_to_failure_keeps_cursor() {
        let mut ctl = controller(&["a.mp3", "b-missing.mp3"]);
        assert!(ctl.jump_to(1).is_err());
        assert_eq!(ctl.state().current_index, 0);
        assert!(ctl.state().current_file.is_none());
    }

    #[test]
    fn test_poll_track_end_advances() {
        let mut ctl = controller(&["a.mp3", "b.mp3"]);
        assert!(!ctl.poll_track_end().unwrap());

        ctl.jump_to(0).unwrap();
        assert!(!ctl.poll_track_end().unwrap());

        // backend ran dry
        ctl.backend.playing = false;
        assert!(ctl.poll_track_end().unwrap());
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("b.mp3")));
        assert!(ctl.is_playing());

        // last track: stop there
        ctl.backend.playing = false;
        assert!(ctl.poll_track_end().unwrap());
        assert_eq!(ctl.state().current_index, 1);
        assert!(!ctl.is_playing());
        assert!(!ctl.poll_track_end().unwrap());
    }

    #[test]
    fn test_poll_track_end_repeat_replays() {
        let mut ctl = controller(&["a.mp3", "b.mp3"]);
        ctl.jump_to(0).unwrap();
        ctl.toggle_repeat();
        ctl.backend.playing = false;
        ctl.backend.take_calls();

        assert!(ctl.poll_track_end().unwrap());
        assert_eq!(ctl.backend.take_calls(), vec![Call::Play]);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));
    }

    #[test]
    fn test_poll_track_end_skips_unloadable() {
        let mut ctl = controller(&["a.mp3", "b-missing.mp3", "c.mp3"]);
        ctl.jump_to(0).unwrap();
        ctl.backend.playing = false;

        assert!(ctl.poll_track_end().unwrap());
        assert_eq!(ctl.state().current_index, 2);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("c.mp3")));
        assert!(ctl.is_playing());
    }

    #[test]
    fn test_poll_track_end_reports_when_nothing_loads() {
        let mut ctl = controller(&["a.mp3", "b-missing.mp3", "c-missing.mp3"]);
        ctl.jump_to(0).unwrap();
        ctl.backend.playing = false;

        let err = ctl.poll_track_end().unwrap_err();
        assert!(err.is_load_error());
        assert_eq!(ctl.state().current_index, 0);
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));
        assert!(!ctl.poll_track_end().unwrap());
    }

    #[test]
    fn test_poll_track_end_shuffle_keeps_going() {
        let mut ctl = controller(&["a.mp3", "b.mp3", "c.wav"]);
        ctl.toggle_shuffle();
        ctl.jump_to(2).unwrap();

        // under shuffle even the last entry moves on
        for _ in 0..10 {
            ctl.backend.playing = false;
            ctl.backend.take_calls();

            assert!(ctl.poll_track_end().unwrap());
            assert!(ctl.is_playing());
            assert!(ctl.state().current_index < 3);

            let calls = ctl.backend.take_calls();
            assert!(matches!(calls.first(), Some(Call::Load(_))));
            assert_eq!(calls.last(), Some(&Call::Play));
        }
    }

    #[test]
    fn test_poll_ignores_pause_and_stop() {
        let mut ctl = controller(&["a.mp3", "b.mp3"]);
        ctl.jump_to(0).unwrap();
        ctl.pause().unwrap();
        assert!(!ctl.poll_track_end().unwrap());

        ctl.stop().unwrap();
        assert!(!ctl.poll_track_end().unwrap());
        assert_eq!(ctl.state().current_file, Some(PathBuf::from("a.mp3")));
    }
}
