//! Seams between the audio thread and the sound library.

use crate::track::Track;

use super::types::PlaybackError;

/// One loaded sound. Dropping it releases the underlying resource.
pub trait Voice {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn set_volume(&self, volume: f32);
    /// True once the sound has played to its end.
    fn is_finished(&self) -> bool;
}

/// Something that can turn a track into a paused voice positioned at zero.
pub trait AudioBackend {
    type Voice: Voice;

    fn load(&mut self, track: &Track) -> Result<Self::Voice, PlaybackError>;
}
