use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, App};
use crate::audio::AudioPlayer;
use crate::client::{ClientError, Playlist, Recommender};
use crate::config;
use crate::playlist::PlaylistPlayer;
use crate::session::{Phase, SessionHandle};
use crate::ui;

/// The player handed back by a finished session and the playlist read after it.
type Handover = (Option<AudioPlayer>, Result<Playlist, ClientError>);

/// Who owns the audio player right now.
pub enum Stage {
    Swiping(SessionHandle),
    /// Session closing and playlist on its way; the player comes back with it.
    Loading(Receiver<Handover>),
    Browsing(PlaylistPlayer),
    /// Session over with nothing left to play.
    Idle(Option<AudioPlayer>),
}

impl Stage {
    /// Stop whatever drives the player and hand the player back.
    fn into_player(self) -> Option<AudioPlayer> {
        match self {
            Stage::Swiping(handle) => handle.shutdown(),
            Stage::Loading(rx) => rx.try_recv().ok().and_then(|(player, _)| player),
            Stage::Browsing(rows) => Some(rows.into_inner()),
            Stage::Idle(player) => player,
        }
    }
}

/// Move to the screen that follows a finished session.
fn leave_session(
    app: &mut App,
    stage: Stage,
    phase: Phase,
    recommender: &Arc<dyn Recommender>,
) -> Stage {
    app.enter_phase(phase);
    match (phase, stage) {
        (Phase::Completed, Stage::Swiping(handle)) => {
            app.await_playlist();
            hand_over(handle, Arc::clone(recommender))
        }
        (_, stage) => Stage::Idle(stage.into_player()),
    }
}

/// Close the session, then read the playlist, both off the UI thread.
/// Shutdown returns only after the completing like was answered.
fn hand_over(handle: SessionHandle, recommender: Arc<dyn Recommender>) -> Stage {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("swipetune-playlist".into())
        .spawn(move || {
            let player = handle.shutdown();
            let _ = tx.send((player, recommender.fetch_playlist()));
        });
    if let Err(e) = spawned {
        log::error!("cannot start playlist fetch: {e}");
    }
    Stage::Loading(rx)
}

/// Pick up the playlist once it has arrived.
fn poll_handover(app: &mut App, rx: &Receiver<Handover>) -> Option<Stage> {
    match rx.try_recv() {
        Ok((player, fetched)) => {
            app.show_playlist(fetched);
            Some(match player {
                Some(player) => Stage::Browsing(PlaylistPlayer::new(player)),
                None => Stage::Idle(None),
            })
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            app.playlist_failed("playlist fetch stopped".to_string());
            Some(Stage::Idle(None))
        }
    }
}

/// Main terminal event loop: input, drawing, and keeping the app model in
/// step with the session. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    mut stage: Stage,
    recommender: &Arc<dyn Recommender>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let size = terminal.size()?;
        app.resize(f32::from(size.width));

        let arrived = match &stage {
            Stage::Loading(rx) => poll_handover(app, rx),
            _ => None,
        };
        if let Some(next) = arrived {
            stage = next;
            continue;
        }

        let ended = match &mut stage {
            Stage::Swiping(handle) => app.sync_session(handle.snapshot(), handle.playback()),
            Stage::Browsing(rows) => {
                rows.sync();
                app.playing_row = rows.playing_id();
                app.playback = rows.status();
                None
            }
            Stage::Loading(_) | Stage::Idle(_) => None,
        };
        if let Some(phase) = ended {
            stage = leave_session(app, stage, phase, recommender);
            continue;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.on_key(key.code) {
            Action::None => {}
            Action::Decide(decision) => {
                if let Stage::Swiping(handle) = &stage {
                    handle.decide(decision);
                }
            }
            Action::TogglePlayback => {
                if let Stage::Swiping(handle) = &stage {
                    handle.toggle_playback();
                }
            }
            Action::PlayRow(track) => {
                if let Stage::Browsing(rows) = &mut stage {
                    rows.toggle_row(&track);
                    app.playing_row = rows.playing_id();
                }
            }
            Action::Quit => break,
        }
    }

    if let Some(player) = stage.into_player() {
        player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    }
    Ok(())
}
