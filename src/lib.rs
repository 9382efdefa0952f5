// OpenUMP Library - terminal audio player core
// Playback logic stays toolkit-free; rodio and ratatui sit behind feature gates

pub mod audio;    // backend seam, rodio engine, directory scanning
pub mod config;   // settings and preferences
pub mod error;    // error types shared across modules
pub mod logging;  // tracing setup
pub mod playback; // playlist/transport controller, status, key routing
#[cfg(feature = "tui")]
pub mod ui;       // terminal interface

// Export the stuff other modules actually use
pub use audio::{AudioBackend, DirectoryScanner};
pub use config::Config;
pub use error::{BackendError, PlayerError};
pub use playback::{InputRouter, Intent, PlaybackState, PlaylistController, StatusPresenter};
