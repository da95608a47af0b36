use std::path::{Path, PathBuf};

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::OfflineSettings;
use crate::track::{Tags, Track, TrackId};

fn is_audio_file(path: &Path, settings: &OfflineSettings) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| !e.is_empty() && e == ext)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// What the file itself says about the recording.
struct Found {
    path: PathBuf,
    title: String,
    artist: String,
    genre: Option<String>,
}

fn read_file(path: &Path) -> Found {
    let mut found = Found {
        path: path.to_path_buf(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        artist: String::new(),
        genre: None,
    };

    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(e) => {
            log::debug!("no tags for {}: {e}", path.display());
            return found;
        }
    };
    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(title) = non_blank(tag.title()) {
            found.title = title;
        }
        if let Some(artist) = non_blank(tag.artist()) {
            found.artist = artist;
        }
        found.genre = non_blank(tag.genre());
    }
    found
}

fn file_uri(path: &Path) -> String {
    let abs = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", abs.display())
}

/// Turn the audio files under `dir` into candidate tracks.
///
/// Ids are assigned 1.. in path order, so the same directory always yields
/// the same ids. Unreadable entries are skipped.
pub fn scan(dir: &Path, settings: &OfflineSettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(depth) = settings.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut found: Vec<Found> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() || (settings.follow_links && e.path().is_file()))
        .filter(|e| is_audio_file(e.path(), settings))
        .map(|e| read_file(e.path()))
        .collect();

    found.sort_by(|a, b| {
        let a = a.path.to_string_lossy().to_lowercase();
        let b = b.path.to_string_lossy().to_lowercase();
        a.cmp(&b)
    });

    found
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let mut tags = Tags::new();
            if let Some(genre) = f.genre {
                tags.entry("genres".to_string()).or_default().insert(genre);
            }
            Track {
                id: (i + 1) as TrackId,
                audio_uri: file_uri(&f.path),
                title: f.title,
                artist: f.artist,
                tags,
            }
        })
        .collect()
}
