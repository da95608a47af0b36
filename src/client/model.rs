//! Wire types for the recommendation backend.

use serde::{Deserialize, Serialize};

use crate::track::{Track, TrackId};

/// Answer to one swipe.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    NextTrack(Track),
    NoMoreCandidates,
    TransientError(String),
}

/// Body of `POST /swipe`.
#[derive(Debug, Clone, Serialize)]
pub struct SwipeRequest {
    pub song_id: TrackId,
    pub liked: bool,
}

/// Success body of `POST /swipe`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwipeResponse {
    #[serde(default)]
    pub song: Option<Track>,
}

/// Body of `GET /playlist`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub liked: Vec<Track>,
    #[serde(default)]
    pub recommended: Vec<Track>,
}
