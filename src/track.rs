//! Candidate track model shared by the queue, the clients and the UI.
//!
//! The wire shape matches the backend: `{id, title, artist, url, tags}` where
//! `tags` groups labels by category (`genres`, `instruments`, ...).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub type TrackId = u64;

/// Tag labels grouped by category. Order carries no meaning.
pub type Tags = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Preview location: an `http(s)://` URL, a `file://` URI or a plain path.
    #[serde(rename = "url")]
    pub audio_uri: String,
    #[serde(default)]
    pub tags: Tags,
}

impl Track {
    /// All tag labels across categories, in category order.
    pub fn tag_labels(&self) -> impl Iterator<Item = &str> {
        self.tags.values().flatten().map(String::as_str)
    }

    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_shape() {
        let raw = r#"{
            "id": 7,
            "title": "Blue",
            "artist": "Someone",
            "url": "https://cdn.example.com/7.mp3",
            "tags": {"genres": ["jazz", "soul"], "instruments": ["piano"], "vartags": []}
        }"#;
        let t: Track = serde_json::from_str(raw).unwrap();
        assert_eq!(t.id, 7);
        assert_eq!(t.audio_uri, "https://cdn.example.com/7.mp3");
        let labels: Vec<&str> = t.tag_labels().collect();
        assert_eq!(labels, vec!["jazz", "soul", "piano"]);
    }

    #[test]
    fn missing_tags_default_to_empty() {
        let raw = r#"{"id": 1, "title": "A", "artist": "B", "url": "a.mp3"}"#;
        let t: Track = serde_json::from_str(raw).unwrap();
        assert!(t.tags.is_empty());
    }

    #[test]
    fn display_skips_blank_artist() {
        let t = Track {
            id: 1,
            title: "Song".into(),
            artist: "  ".into(),
            audio_uri: String::new(),
            tags: Tags::new(),
        };
        assert_eq!(t.display(), "Song");
    }
}
