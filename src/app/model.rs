//! Application model: what the screens show and how keys change it.
//!
//! The `App` never talks to the session or the audio thread itself; key
//! handling returns an `Action` and the runtime carries it out.

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use crate::audio::PlaybackInfo;
use crate::client::{ClientError, Playlist};
use crate::config::Settings;
use crate::gesture::{DragTracker, SwipeDecision, SwipeOutcome};
use crate::session::{Phase, SessionSnapshot};
use crate::track::{Track, TrackId};

/// Which screen is up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Swipe,
    Playlist,
    /// Out of candidates; a new photo is needed for fresh ones.
    Exhausted,
    Failed(String),
}

/// Side effect requested by a key press.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    None,
    Decide(SwipeDecision),
    TogglePlayback,
    PlayRow(Track),
    Quit,
}

/// Last accepted or rejected card, kept while its exit animation runs.
#[derive(Clone, Debug)]
pub struct Departure {
    pub outcome: SwipeOutcome,
    pub title: String,
    pub at: Instant,
    pub duration: Duration,
}

pub struct App {
    pub screen: Screen,
    pub drag: DragTracker,
    pub session: SessionSnapshot,
    pub playback: PlaybackInfo,
    pub playlist: Playlist,
    pub playlist_error: Option<String>,
    /// The playlist has been asked for and has not arrived yet.
    pub playlist_loading: bool,
    pub selected: usize,
    pub playing_row: Option<TrackId>,
    pub departure: Option<Departure>,

    swipe_fraction: f32,
    nudge_fraction: f32,
    viewport_width: f32,
}

impl App {
    pub fn new(settings: &Settings, session: SessionSnapshot, viewport_width: f32) -> Self {
        Self {
            screen: Screen::Swipe,
            drag: DragTracker::new(viewport_width, settings.session.swipe_threshold),
            session,
            playback: PlaybackInfo::default(),
            playlist: Playlist::default(),
            playlist_error: None,
            playlist_loading: false,
            selected: 0,
            playing_row: None,
            departure: None,

            swipe_fraction: settings.session.swipe_threshold,
            nudge_fraction: settings.ui.nudge_fraction,
            viewport_width,
        }
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn resize(&mut self, viewport_width: f32) {
        if viewport_width != self.viewport_width {
            self.viewport_width = viewport_width;
            self.drag.resize(viewport_width, self.swipe_fraction);
        }
    }

    /// Take the latest session state. Returns the phase when the session
    /// has just left `Active`.
    pub fn sync_session(&mut self, snapshot: SessionSnapshot, playback: PlaybackInfo) -> Option<Phase> {
        let was_active = self.session.phase == Phase::Active;
        self.session = snapshot;
        self.playback = playback;
        if was_active && self.session.phase.is_terminal() {
            self.drag.reset();
            Some(self.session.phase)
        } else {
            None
        }
    }

    /// Leave the swipe screen for whatever `phase` calls for.
    pub fn enter_phase(&mut self, phase: Phase) {
        self.screen = match phase {
            Phase::Active => Screen::Swipe,
            Phase::Completed => Screen::Playlist,
            Phase::Exhausted => Screen::Exhausted,
            Phase::Error => Screen::Failed(
                self.session
                    .notice
                    .clone()
                    .unwrap_or_else(|| "audio stopped working".to_string()),
            ),
        };
    }

    /// Open the playlist screen empty until `show_playlist` delivers it.
    pub fn await_playlist(&mut self) {
        self.screen = Screen::Playlist;
        self.selected = 0;
        self.playlist = Playlist::default();
        self.playlist_error = None;
        self.playlist_loading = true;
    }

    pub fn show_playlist(&mut self, fetched: Result<Playlist, ClientError>) {
        match fetched {
            Ok(playlist) => {
                self.screen = Screen::Playlist;
                self.selected = 0;
                self.playlist = playlist;
                self.playlist_error = None;
                self.playlist_loading = false;
            }
            Err(e) => self.playlist_failed(e.to_string()),
        }
    }

    pub fn playlist_failed(&mut self, reason: String) {
        log::warn!("playlist unavailable: {reason}");
        self.screen = Screen::Playlist;
        self.selected = 0;
        self.playlist = Playlist::default();
        self.playlist_error = Some(reason);
        self.playlist_loading = false;
    }

    /// Playlist rows: liked tracks first, then recommendations.
    pub fn rows(&self) -> impl Iterator<Item = &Track> {
        self.playlist
            .liked
            .iter()
            .chain(self.playlist.recommended.iter())
    }

    pub fn row_count(&self) -> usize {
        self.playlist.liked.len() + self.playlist.recommended.len()
    }

    pub fn selected_row(&self) -> Option<&Track> {
        self.rows().nth(self.selected)
    }

    pub fn next(&mut self) {
        let n = self.row_count();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn prev(&mut self) {
        let n = self.row_count();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    fn head_id(&self) -> Option<TrackId> {
        self.session.head.as_ref().map(|t| t.id)
    }

    fn nudge(&mut self, direction: f32) {
        self.drag
            .nudge(direction * self.viewport_width * self.nudge_fraction);
    }

    /// End the current drag. Cancel and an empty deck produce nothing.
    fn release(&mut self, velocity_x: f32) -> Action {
        let release = self.drag.release(velocity_x);
        let (Some(id), Some(duration)) = (self.head_id(), release.exit) else {
            return Action::None;
        };
        let title = self
            .session
            .head
            .as_ref()
            .map(Track::display)
            .unwrap_or_default();
        self.departure = Some(Departure {
            outcome: release.outcome,
            title,
            at: Instant::now(),
            duration,
        });
        Action::Decide(release.outcome.for_track(id))
    }

    /// Throw the card past the threshold in one go.
    fn fling(&mut self, direction: f32) -> Action {
        let distance = self.drag.threshold() + 1.0;
        let dy = self.drag.dy();
        self.drag.update(direction * distance, dy);
        self.release(direction * self.viewport_width * 4.0)
    }

    pub fn departure_visible(&self, now: Instant) -> bool {
        self.departure
            .as_ref()
            .is_some_and(|d| now.duration_since(d.at) < d.duration)
    }

    pub fn on_key(&mut self, code: KeyCode) -> Action {
        if code == KeyCode::Char('q') {
            return Action::Quit;
        }
        match self.screen {
            Screen::Swipe => self.on_swipe_key(code),
            Screen::Playlist => self.on_playlist_key(code),
            Screen::Exhausted | Screen::Failed(_) => Action::None,
        }
    }

    fn on_swipe_key(&mut self, code: KeyCode) -> Action {
        if self.session.phase != Phase::Active {
            return Action::None;
        }
        match code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.nudge(-1.0);
                Action::None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.nudge(1.0);
                Action::None
            }
            KeyCode::Enter => self.release(0.0),
            KeyCode::Char('a') => self.fling(-1.0),
            KeyCode::Char('d') => self.fling(1.0),
            KeyCode::Esc => {
                self.drag.reset();
                Action::None
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePlayback,
            _ => Action::None,
        }
    }

    fn on_playlist_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.next();
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.prev();
                Action::None
            }
            KeyCode::Enter => match self.selected_row() {
                Some(track) => Action::PlayRow(track.clone()),
                None => Action::None,
            },
            _ => Action::None,
        }
    }
}
