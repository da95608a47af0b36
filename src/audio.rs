//! Audio lifecycle: a dedicated thread owns the single active voice.
//!
//! Commands are applied strictly in order on that thread, so the voice for
//! one track is always stopped and released before the next one is loaded.

mod backend;
mod player;
mod sink;
mod thread;
mod types;

pub use backend::{AudioBackend, Voice};
pub use player::AudioPlayer;
pub use sink::RodioBackend;
pub use types::{AudioCmd, PlaybackError, PlaybackInfo, StatusHandle};

#[cfg(test)]
mod tests;

#[cfg(test)]
pub(crate) mod fake;
