use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::track::{Tags, Track, TrackId};

use super::error::ClientError;
use super::model::{Playlist, Replacement};
use super::Recommender;

struct OfflineState {
    pending: VecDeque<Track>,
    known: HashMap<TrackId, Track>,
    liked: Vec<Track>,
}

/// Deals replacements from a fixed catalog without any network round-trip.
pub struct OfflineRecommender {
    state: Mutex<OfflineState>,
}

impl OfflineRecommender {
    /// `dealt` are the cards already in the queue; they are never dealt again.
    pub fn new(catalog: Vec<Track>, dealt: &[Track]) -> Self {
        let mut known: HashMap<TrackId, Track> =
            dealt.iter().map(|t| (t.id, t.clone())).collect();
        let mut pending = VecDeque::new();
        for t in catalog {
            if known.contains_key(&t.id) {
                continue;
            }
            known.insert(t.id, t.clone());
            pending.push_back(t);
        }
        Self {
            state: Mutex::new(OfflineState {
                pending,
                known,
                liked: Vec::new(),
            }),
        }
    }

    /// Split `catalog` into the first `initial` cards and a recommender
    /// holding the rest.
    pub fn deal(mut catalog: Vec<Track>, initial: usize) -> (Vec<Track>, Self) {
        let rest = catalog.split_off(initial.min(catalog.len()));
        let recommender = Self::new(rest, &catalog);
        (catalog, recommender)
    }

    pub fn remaining(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, OfflineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Recommender for OfflineRecommender {
    fn request_replacement(&self, track_id: TrackId, liked: bool) -> Replacement {
        let mut st = self.lock();
        if liked {
            if let Some(t) = st.known.get(&track_id).cloned() {
                if !st.liked.iter().any(|l| l.id == track_id) {
                    st.liked.push(t);
                }
            }
        }
        match st.pending.pop_front() {
            Some(next) => Replacement::NextTrack(next),
            None => Replacement::NoMoreCandidates,
        }
    }

    fn fetch_playlist(&self) -> Result<Playlist, ClientError> {
        let st = self.lock();
        Ok(Playlist {
            liked: st.liked.clone(),
            recommended: st.pending.iter().cloned().collect(),
        })
    }
}

fn tags(genres: &[&str], instruments: &[&str]) -> Tags {
    let mut tags = Tags::new();
    tags.insert(
        "genres".to_string(),
        genres.iter().map(|s| s.to_string()).collect(),
    );
    tags.insert(
        "instruments".to_string(),
        instruments.iter().map(|s| s.to_string()).collect(),
    );
    tags
}

/// Candidates used when there is neither a seed nor a local music directory.
pub fn builtin_catalog() -> Vec<Track> {
    let entries: [(&str, &[&str], &[&str]); 8] = [
        ("Morning Circuit", &["electronic"], &["synth"]),
        ("Paper Lanterns", &["ambient"], &["piano", "pad"]),
        ("Harbor Lights", &["pop"], &["guitar"]),
        ("Slow Orbit", &["downtempo"], &["bass", "synth"]),
        ("Signal Fire", &["rock"], &["drums", "guitar"]),
        ("Glass Garden", &["ambient"], &["bells"]),
        ("Night Market", &["electronic", "funk"], &["bass"]),
        ("Lowland Rain", &["folk"], &["acoustic guitar"]),
    ];
    entries
        .iter()
        .enumerate()
        .map(|(i, (title, genres, instruments))| {
            let n = i + 1;
            Track {
                id: n as TrackId,
                title: title.to_string(),
                artist: "SoundHelix".to_string(),
                audio_uri: format!(
                    "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{n}.mp3"
                ),
                tags: tags(genres, instruments),
            }
        })
        .collect()
}
