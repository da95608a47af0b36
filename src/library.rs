//! Offline candidates: a scanned music directory or the built-in catalog.

use rand::{rng, seq::SliceRandom};

use crate::client::builtin_catalog;
use crate::config::OfflineSettings;
use crate::track::Track;

mod scan;

pub use scan::scan;

/// The full offline catalog, in dealing order.
pub fn offline_catalog(settings: &OfflineSettings) -> Vec<Track> {
    let mut tracks = match settings.music_dir.as_deref() {
        Some(dir) => {
            let scanned = scan(dir, settings);
            if scanned.is_empty() {
                log::warn!(
                    "no audio files under {}; using the built-in catalog",
                    dir.display()
                );
                builtin_catalog()
            } else {
                log::info!("found {} tracks under {}", scanned.len(), dir.display());
                scanned
            }
        }
        None => builtin_catalog(),
    };

    if settings.shuffle {
        tracks.shuffle(&mut rng());
    }
    tracks
}
