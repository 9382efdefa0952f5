// The seam between the playlist logic and whatever actually makes sound
// Volume is normalized (MIN_VOLUME..=MAX_VOLUME) and seek takes an absolute position

use crate::error::BackendError;
use std::path::Path;
use std::time::Duration;

/// Audio engine capability owned by the playlist controller.
///
/// `load` only prepares a file; nothing is audible until `play`. Calling
/// `play` again restarts the loaded file from the beginning, `resume`
/// continues after a `pause`.
pub trait AudioBackend {
    fn load(&mut self, path: &Path) -> Result<(), BackendError>;
    fn play(&mut self) -> Result<(), BackendError>;
    fn pause(&mut self) -> Result<(), BackendError>;
    fn resume(&mut self) -> Result<(), BackendError>;
    fn stop(&mut self) -> Result<(), BackendError>;
    /// Jump to an absolute position from the start of the track.
    fn seek(&mut self, position: Duration) -> Result<(), BackendError>;
    fn set_volume(&mut self, level: f32) -> Result<(), BackendError>;
    /// True while audio is actually being produced (false when paused).
    fn is_playing(&self) -> bool;
    fn position(&self) -> Duration;
}
