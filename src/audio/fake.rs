//! In-memory backend for tests: counts live voices instead of making noise.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::track::{Track, TrackId};

use super::backend::{AudioBackend, Voice};
use super::player::AudioPlayer;
use super::types::PlaybackError;

#[derive(Default)]
struct ProbeState {
    live: Vec<TrackId>,
    max_live: usize,
    loads: Vec<TrackId>,
    finished: HashSet<TrackId>,
}

/// Observations shared between a test and the audio thread.
#[derive(Clone, Default)]
pub(crate) struct Probe(Arc<Mutex<ProbeState>>);

impl Probe {
    fn with<R>(&self, f: impl FnOnce(&mut ProbeState) -> R) -> R {
        let mut st = self.0.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut st)
    }

    /// Tracks whose voices currently exist.
    pub(crate) fn live(&self) -> Vec<TrackId> {
        self.with(|st| st.live.clone())
    }

    /// Highest number of voices that ever existed at the same time.
    pub(crate) fn max_live(&self) -> usize {
        self.with(|st| st.max_live)
    }

    /// Every successful load, in order.
    pub(crate) fn loads(&self) -> Vec<TrackId> {
        self.with(|st| st.loads.clone())
    }

    /// Pretend the voice for `id` reached the end of its audio.
    pub(crate) fn finish(&self, id: TrackId) {
        self.with(|st| {
            st.finished.insert(id);
        });
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    probe: Probe,
    delays: HashMap<TrackId, Duration>,
    failing: HashSet<TrackId>,
}

impl FakeBackend {
    pub(crate) fn new(probe: Probe) -> Self {
        Self {
            probe,
            ..Self::default()
        }
    }

    /// Make loading `id` take `delay`, like a slow download.
    pub(crate) fn slow(mut self, id: TrackId, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Make loading `id` fail.
    pub(crate) fn broken(mut self, id: TrackId) -> Self {
        self.failing.insert(id);
        self
    }

    pub(crate) fn into_player(self) -> AudioPlayer {
        AudioPlayer::spawn(move || Ok(self), &AudioSettings::default())
            .expect("spawn audio thread")
    }
}

impl AudioBackend for FakeBackend {
    type Voice = FakeVoice;

    fn load(&mut self, track: &Track) -> Result<FakeVoice, PlaybackError> {
        if let Some(delay) = self.delays.get(&track.id) {
            thread::sleep(*delay);
        }
        if self.failing.contains(&track.id) {
            return Err(PlaybackError::Decode {
                uri: track.audio_uri.clone(),
                reason: "unsupported format".into(),
            });
        }
        self.probe.with(|st| {
            st.live.push(track.id);
            st.max_live = st.max_live.max(st.live.len());
            st.loads.push(track.id);
        });
        Ok(FakeVoice {
            probe: self.probe.clone(),
            id: track.id,
            playing: Cell::new(false),
        })
    }
}

pub(crate) struct FakeVoice {
    probe: Probe,
    id: TrackId,
    playing: Cell<bool>,
}

impl Voice for FakeVoice {
    fn play(&self) {
        self.playing.set(true);
    }

    fn pause(&self) {
        self.playing.set(false);
    }

    fn stop(&self) {
        self.playing.set(false);
    }

    fn set_volume(&self, _volume: f32) {}

    fn is_finished(&self) -> bool {
        self.probe.with(|st| st.finished.contains(&self.id))
    }
}

impl Drop for FakeVoice {
    fn drop(&mut self) {
        let id = self.id;
        self.probe.with(|st| st.live.retain(|&x| x != id));
    }
}

pub(crate) fn track(id: TrackId) -> Track {
    Track {
        id,
        title: format!("Track {id}"),
        artist: "Tester".into(),
        audio_uri: format!("https://cdn.example.com/{id}.mp3"),
        tags: Default::default(),
    }
}
