use thiserror::Error;

use crate::track::Track;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed is not a JSON list of tracks: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a photo-analysis payload: a JSON array of `{id, title, artist, url, tags}`.
pub fn parse_seed(payload: &str) -> Result<Vec<Track>, SeedError> {
    Ok(serde_json::from_str(payload)?)
}

/// The seeded cards, or `None` when there is no payload or it is unusable.
/// An empty but well-formed list is kept as is.
pub fn usable_seed(payload: Option<&str>) -> Option<Vec<Track>> {
    match parse_seed(payload?) {
        Ok(tracks) => {
            log::info!("seeded session with {} tracks", tracks.len());
            Some(tracks)
        }
        Err(e) => {
            log::warn!("{e}; using the static candidate list");
            None
        }
    }
}

/// Seeded cards when the payload is usable, `fallback` otherwise.
pub fn seed_or_fallback(payload: Option<&str>, fallback: impl FnOnce() -> Vec<Track>) -> Vec<Track> {
    usable_seed(payload).unwrap_or_else(fallback)
}
