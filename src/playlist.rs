//! Per-row playback on the playlist screen.

use crate::audio::{AudioPlayer, PlaybackInfo};
use crate::track::{Track, TrackId};

/// Wraps the session's audio player once the session is over. Only one row
/// plays at a time: starting a row goes through the same single voice slot.
pub struct PlaylistPlayer {
    player: AudioPlayer,
    playing: Option<TrackId>,
}

impl PlaylistPlayer {
    pub fn new(player: AudioPlayer) -> Self {
        Self {
            player,
            playing: None,
        }
    }

    /// Row the user last started, unless it was stopped since.
    pub fn playing_id(&self) -> Option<TrackId> {
        self.playing
    }

    pub fn status(&self) -> PlaybackInfo {
        self.player.status()
    }

    /// Play `track`, or stop it when it is the row already playing.
    pub fn toggle_row(&mut self, track: &Track) {
        if self.playing == Some(track.id) {
            self.stop();
            return;
        }
        match self.player.start(track.clone()) {
            Ok(()) => self.playing = Some(track.id),
            Err(_) => {
                log::warn!("audio thread is gone; cannot play {}", track.id);
                self.playing = None;
            }
        }
    }

    pub fn stop(&mut self) {
        let _ = self.player.stop();
        self.playing = None;
    }

    /// Forget a row that played to the end on its own.
    pub fn sync(&mut self) {
        if self.playing.is_some() && self.status().track_id.is_none() {
            self.playing = None;
        }
    }

    pub fn wait_idle(&self) -> bool {
        self.player.wait_idle()
    }

    pub fn into_inner(self) -> AudioPlayer {
        self.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::{track, FakeBackend, Probe};

    #[test]
    fn playing_another_row_stops_the_first() {
        let probe = Probe::default();
        let mut rows = PlaylistPlayer::new(FakeBackend::new(probe.clone()).into_player());

        rows.toggle_row(&track(1));
        rows.toggle_row(&track(2));
        assert!(rows.wait_idle());

        assert_eq!(rows.playing_id(), Some(2));
        assert_eq!(probe.live(), vec![2]);
        assert_eq!(probe.max_live(), 1);
    }

    #[test]
    fn pressing_the_playing_row_stops_it() {
        let probe = Probe::default();
        let mut rows = PlaylistPlayer::new(FakeBackend::new(probe.clone()).into_player());

        rows.toggle_row(&track(3));
        rows.toggle_row(&track(3));
        assert!(rows.wait_idle());

        assert_eq!(rows.playing_id(), None);
        assert!(probe.live().is_empty());
    }

    #[test]
    fn sync_forgets_a_finished_row() {
        let probe = Probe::default();
        let mut rows = PlaylistPlayer::new(FakeBackend::new(probe.clone()).into_player());

        rows.toggle_row(&track(4));
        assert!(rows.wait_idle());
        probe.finish(4);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while rows.status().track_id.is_some() {
            assert!(std::time::Instant::now() < deadline, "voice never released");
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        rows.sync();
        assert_eq!(rows.playing_id(), None);
    }

    #[test]
    fn failed_load_leaves_nothing_playing() {
        let probe = Probe::default();
        let mut rows = PlaylistPlayer::new(FakeBackend::new(probe.clone()).broken(5).into_player());

        rows.toggle_row(&track(5));
        assert!(rows.wait_idle());
        rows.sync();

        assert_eq!(rows.playing_id(), None);
        assert!(rows.status().last_error.is_some());
        assert!(probe.live().is_empty());
    }
}
