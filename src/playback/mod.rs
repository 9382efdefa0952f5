// Playback core - playlist/transport state machine plus the thin layers around it
// Nothing in here knows about rodio or ratatui

pub mod controller; // owns PlaybackState, talks to the backend
pub mod input;      // key -> intent -> controller
pub mod status;     // status line derived from state

pub use controller::{PlaybackState, PlaylistController};
pub use input::{Flow, InputRouter, Intent, Key};
pub use status::{Phase, StatusLine, StatusPresenter};
