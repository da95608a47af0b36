//! Audio-related small types and handles.
//!
//! This module defines the commands accepted by the audio thread, the
//! playback status it publishes and the errors it can swallow.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::track::{Track, TrackId};

#[derive(Debug)]
pub enum AudioCmd {
    /// Release any active voice, then play `Track` from the beginning.
    Start(Track),
    /// Release the active voice, if any.
    Stop,
    /// Pause or resume the active voice; ignored when nothing is loaded.
    Toggle,
    /// Change the output volume of the current and future voices.
    SetVolume(f32),
    /// Answered once every earlier command has been applied.
    Barrier(Sender<()>),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

impl AudioCmd {
    /// Whether this command makes an earlier, not yet loaded `Start` pointless.
    pub(super) fn supersedes_start(&self) -> bool {
        matches!(self, AudioCmd::Start(_) | AudioCmd::Stop | AudioCmd::Quit { .. })
    }
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the UI. Display only.
pub struct PlaybackInfo {
    /// Track bound to the active voice (if any).
    pub track_id: Option<TrackId>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Whether the active voice is audible right now.
    pub playing: bool,
    /// Last load failure, cleared by the next successful start or stop.
    pub last_error: Option<String>,
}

pub type StatusHandle = Arc<Mutex<PlaybackInfo>>;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {uri}: {reason}")]
    Fetch { uri: String, reason: String },
    #[error("failed to decode {uri}: {reason}")]
    Decode { uri: String, reason: String },
    #[error("no audio output: {0}")]
    Output(String),
}
